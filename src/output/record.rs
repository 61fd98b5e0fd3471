use url::Url;

/// Column names of the output file, in order
pub const CSV_HEADER: [&str; 7] = [
    "Name",
    "Address",
    "Website",
    "Phone",
    "Email",
    "Source",
    "CapturedAt",
];

/// One crawled business
///
/// Created from a detail page; `email` is filled in at most once by the email
/// resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRecord {
    pub name: String,
    pub address: String,

    /// Absolute URL of the company's own website
    pub website: Option<String>,

    /// Phone number as printed, not normalized
    pub phone: Option<String>,

    /// Validated email address
    pub email: Option<String>,

    /// Detail page the record was extracted from
    pub detail_url: Option<Url>,
}

impl CompanyRecord {
    /// Returns true if the record carries a name or an address
    pub fn is_found(&self) -> bool {
        !self.name.trim().is_empty() || !self.address.trim().is_empty()
    }

    /// Label used in log lines
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }

    /// CSV row in `CSV_HEADER` order
    pub fn to_row(&self, source: &str, captured_at: &str) -> [String; 7] {
        [
            self.name.clone(),
            self.address.clone(),
            self.website.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            source.to_string(),
            captured_at.to_string(),
        ]
    }
}
