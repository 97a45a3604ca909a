use std::fmt;

/// Named listing predicate. Unrecognised input means `All`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VacationFilter {
    #[default]
    All,
    Following,
    Upcoming,
    Active,
}

impl VacationFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("following") => VacationFilter::Following,
            Some("upcoming") => VacationFilter::Upcoming,
            Some("active") => VacationFilter::Active,
            _ => VacationFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VacationFilter::All => "all",
            VacationFilter::Following => "following",
            VacationFilter::Upcoming => "upcoming",
            VacationFilter::Active => "active",
        }
    }
}

impl fmt::Display for VacationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
