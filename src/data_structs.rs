use serde::Serializer;

/// One ranked entry of one source's list.
///
/// Field names match the column headers of a per-source CSV. Only `Position`
/// and `Title` are required; the rest are left empty when a source doesn't
/// provide them.
#[derive(Debug, Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameEntry {
    pub position: u32,
    pub title: String,
    pub release_date: Option<String>,
    pub external_id: Option<String>,
    #[serde(serialize_with = "serialize_opt_score")]
    pub score: Option<f64>,
    pub game_id: Option<String>,
    pub cover_image_id: Option<String>
}

impl GameEntry {
    #[inline]
    pub fn new<T: Into<String>>(position: u32, title: T) -> Self {
        GameEntry {
            position,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for the explicit score.
    #[inline]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    #[inline]
    pub fn with_release_date<T: Into<String>>(mut self, date: T) -> Self {
        self.release_date = Some(date.into());
        self
    }
}

/// Fills in `Score = total - position + 1` for every entry, where `total` is
/// the number of entries in the list.
pub fn fill_positional_scores(entries: &mut [GameEntry]) {
    let total = entries.len() as f64;

    for entry in entries.iter_mut() {
        entry.score = Some(total - f64::from(entry.position) + 1.0);
    }
}

/// One row of a list's `about.csv`: which per-source file was produced (or
/// consumed) and when.
#[derive(Debug, Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "SourceName")]
    pub source_name: String,
    #[serde(rename = "SourceUrl", alias = "SourceURL", default)]
    pub source_url: String,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
    #[serde(rename = "GeneratedCsvPath", default)]
    pub generated_csv_path: String
}

/// One row of `aggregated-list.csv`.
#[derive(Debug, Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AggregatedEntry {
    pub position: u32,
    /// Display title: the first-seen original form of the game's title.
    pub title: String,
    #[serde(serialize_with = "serialize_score")]
    pub total_score: f64,
    pub lists_appeared: u32,
    /// The cross-source join key. Not written to disk.
    #[serde(skip)]
    pub canonical_title: String
}

/// Index of the lists the viewer can discover, written to `_manifest.json`.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated_at: String,
    pub lists: Vec<String>
}

/// One row of the cross-list `all_sources.csv`.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceIndexRow {
    pub source_name: String,
    pub count: u32,
    pub datasets: String
}

/// Scores are whole numbers almost always; write `3` rather than `3.0`.
fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&score.to_string())
}

fn serialize_opt_score<S: Serializer>(score: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match score {
        Some(score) => serialize_score(score, serializer),
        None => serializer.serialize_none()
    }
}
