// src/riro/models.rs
use clap::ValueEnum;
use serde::Deserialize;

/// Rows the site renders per board page.
pub const PAGE_SIZE: usize = 20;

/// Board databases, by the `db` query parameter the site uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DbId {
    /// 개인별 공지
    IndividualAnnouncement,
    /// 가정통신문 (전학년)
    Announcement,
    FirstGradeAnnouncement,
    SecondGradeAnnouncement,
    ThirdGradeAnnouncement,
    /// 설문조사
    Votes,
    /// 급식 신청
    MealApplication,
    /// 통학버스 신청
    BusApplication,
    /// 특별실.상담 예약
    CounselingApplication,
    /// 학사 일정
    SchoolSchedule,
    /// 오늘의식단
    MealCalendar,
    /// 결석신고서
    AbsenceReport,
    /// 활동보고서 / 포트폴리오
    Portfolio,
    /// 활동보고서 / 교과 활동
    CurricularActivity,
    /// 활동보고서 / 경시대회
    Contest,
}

impl DbId {
    pub fn code(self) -> u32 {
        match self {
            DbId::IndividualAnnouncement => 1841,
            DbId::Announcement => 1901,
            DbId::FirstGradeAnnouncement => 1902,
            DbId::SecondGradeAnnouncement => 1903,
            DbId::ThirdGradeAnnouncement => 1904,
            DbId::Votes => 1906,
            DbId::BusApplication => 1907,
            DbId::MealApplication => 1951,
            DbId::CounselingApplication => 1961,
            DbId::SchoolSchedule => 2301,
            DbId::AbsenceReport => 2302,
            DbId::MealCalendar => 2303,
            DbId::Portfolio => 1502,
            DbId::CurricularActivity => 1551,
            DbId::Contest => 1552,
        }
    }
}

/// What to request from a board: which database, which category and how
/// many rows in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbInfo {
    pub id: DbId,
    pub category: u32,
    pub count: usize,
}

impl DbInfo {
    pub fn new(id: DbId) -> Self {
        Self { id, category: 0, count: PAGE_SIZE }
    }

    pub fn with_category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Pages needed for `count` rows, at least one.
    pub fn page_count(&self) -> usize {
        self.count.div_ceil(PAGE_SIZE).max(1)
    }
}

/// When to stop requesting pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PagePolicy {
    /// Always request every page `DbInfo::page_count` asks for.
    #[default]
    Fixed,
    /// Stop after the first page that has fewer than `PAGE_SIZE` rows.
    StopOnShortPage,
}

/// Body of the `ajax.php` login response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub code: String,
    #[serde(rename = "msg", default)]
    pub message: String,
    #[serde(rename = "cid", default)]
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub data: LoginData,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginData {
    #[serde(rename = "lock", default)]
    pub locked: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub set_app: Vec<serde_json::Value>,
}

impl LoginResponse {
    pub const SUCCESS: &'static str = "000";

    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}
