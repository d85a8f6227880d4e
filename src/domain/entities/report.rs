use serde::{Deserialize, Serialize};

use crate::domain::entities::mapping::Fixture;

pub const TOILET_COUNT_PLACEHOLDER: &str = "{toiletCount}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomerInfo {
    pub customer_name: String,
    pub property_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub date: String,
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            property_name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
        }
    }
}

impl CustomerInfo {
    pub fn location_line(&self) -> String {
        let city_state = [self.city.trim(), self.state.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        [self.address.trim(), city_state.as_str(), self.zip.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Editable prose of the cover and letter pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportText {
    pub title: String,
    pub re_prefix: String,
    pub dear_prefix: String,
    pub letter_paragraphs: Vec<String>,
    pub signature_name: String,
    pub signature_title: String,
}

impl Default for ReportText {
    fn default() -> Self {
        Self {
            title: "Water Conservation Installation Report".to_string(),
            re_prefix: "RE:".to_string(),
            dear_prefix: "Dear".to_string(),
            letter_paragraphs: vec![
                "Please find the attached Installation Report. As you can see, we clearly indicated the installed items in each area. You will see the repairs that we made noted as well.".to_string(),
                format!("We successfully installed {TOILET_COUNT_PLACEHOLDER} toilets at the property."),
                "Please send us copies of the actual water bills following our installation, so we can analyze them to pinpoint the anticipated water reduction and savings. We urge you to fix any constant water issues ASAP, as not to compromise potential savings as a result of our installation.".to_string(),
                "Thank you for choosing Green Light Water Conservation. We look forward to working with you in the near future.".to_string(),
            ],
            signature_name: "Zev Stern, CWEP".to_string(),
            signature_title: "Chief Operating Officer".to_string(),
        }
    }
}

impl ReportText {
    pub fn paragraphs_with_count(&self, toilet_count: u32) -> Vec<String> {
        self.letter_paragraphs
            .iter()
            .map(|paragraph| paragraph.replace(TOILET_COUNT_PLACEHOLDER, &toilet_count.to_string()))
            .collect()
    }
}

/// Header labels of the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnHeaders {
    pub unit: String,
    pub kitchen: String,
    pub bathroom: String,
    pub shower: String,
    pub toilet: String,
    pub notes: String,
}

impl Default for ColumnHeaders {
    fn default() -> Self {
        Self {
            unit: "Unit".to_string(),
            kitchen: "Kitchen Installed".to_string(),
            bathroom: "Bathroom Installed".to_string(),
            shower: "Shower Installed".to_string(),
            toilet: "Toilet Installed".to_string(),
            notes: "Notes".to_string(),
        }
    }
}

impl ColumnHeaders {
    pub fn label(&self, column: DetailColumn) -> &str {
        match column {
            DetailColumn::Unit => &self.unit,
            DetailColumn::Fixture(Fixture::Kitchen) => &self.kitchen,
            DetailColumn::Fixture(Fixture::Bathroom) => &self.bathroom,
            DetailColumn::Fixture(Fixture::Shower) => &self.shower,
            DetailColumn::Fixture(Fixture::Toilet) => &self.toilet,
            DetailColumn::Notes => &self.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionTitles {
    pub notes: String,
    pub details_title: String,
}

impl Default for SectionTitles {
    fn default() -> Self {
        Self {
            notes: "Notes".to_string(),
            details_title: "Detailed Unit Information".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailColumn {
    Unit,
    Fixture(Fixture),
    Notes,
}

/// A reconciled row of the detail table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRow {
    pub unit: String,
    pub kitchen: String,
    pub bathroom: String,
    pub shower: String,
    pub toilet: String,
    pub note: String,
    /// The note is the not-accessed fallback and no override replaced it.
    pub not_accessed: bool,
    /// The unit was added by hand rather than imported.
    pub added: bool,
}

impl DetailRow {
    pub fn cell(&self, column: DetailColumn) -> &str {
        match column {
            DetailColumn::Unit => &self.unit,
            DetailColumn::Fixture(Fixture::Kitchen) => &self.kitchen,
            DetailColumn::Fixture(Fixture::Bathroom) => &self.bathroom,
            DetailColumn::Fixture(Fixture::Shower) => &self.shower,
            DetailColumn::Fixture(Fixture::Toilet) => &self.toilet,
            DetailColumn::Notes => &self.note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub unit: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPage {
    pub title: String,
    pub property_name: String,
    pub location: String,
    pub customer_name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterPage {
    pub date: String,
    pub customer_name: String,
    pub property_name: String,
    pub location: String,
    pub re_line: String,
    pub salutation: String,
    pub paragraphs: Vec<String>,
    pub signature_name: String,
    pub signature_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesSection {
    pub title: String,
    pub unit_header: String,
    pub note_header: String,
    pub rows: Vec<NoteRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: String,
    pub columns: Vec<(DetailColumn, String)>,
    pub rows: Vec<DetailRow>,
}

/// Everything the exporter needs, already reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub cover: CoverPage,
    pub letter: LetterPage,
    pub notes: NotesSection,
    pub detail: DetailSection,
}
