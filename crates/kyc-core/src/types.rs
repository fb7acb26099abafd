//! Core type definitions for the KYC flow

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{KycError, Result};

/// Placeholder shown for any review field the backend did not extract
pub const PLACEHOLDER: &str = "N/A";

pub const FIELD_FULL_NAME: &str = "Full Name";
pub const FIELD_AADHAAR_NUMBER: &str = "Aadhaar Number";
pub const FIELD_DATE_OF_BIRTH: &str = "Date of Birth";
pub const FIELD_PAN_NUMBER: &str = "PAN Number";
pub const FIELD_PAN_NAME: &str = "PAN Name";

/// Review labels in display order
pub const REVIEW_FIELDS: [&str; 5] = [
    FIELD_FULL_NAME,
    FIELD_AADHAAR_NUMBER,
    FIELD_DATE_OF_BIRTH,
    FIELD_PAN_NUMBER,
    FIELD_PAN_NAME,
];

/// Narration audio returned by the remote voice service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechAudio {
    /// Audio hosted elsewhere, played by URL
    Url(String),
    /// Inline WAV bytes
    Wav(Vec<u8>),
}

/// What a captured image shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Aadhaar,
    Pan,
    Face,
}

impl DocumentKind {
    /// Backend endpoint that verifies this kind of image
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Aadhaar => "/kyc/process-aadhaar",
            Self::Pan => "/kyc/process-pan",
            Self::Face => "/kyc/process-face",
        }
    }

    /// JSON field carrying the image payload
    pub fn image_field(&self) -> &'static str {
        match self {
            Self::Aadhaar => "aadhaar_image",
            Self::Pan => "pan_image",
            Self::Face => "face_image",
        }
    }

    /// Human label used in prompts and buttons
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aadhaar => "Aadhaar",
            Self::Pan => "PAN",
            Self::Face => "Face",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aadhaar => write!(f, "aadhaar"),
            Self::Pan => write!(f, "pan"),
            Self::Face => write!(f, "face"),
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aadhaar" => Ok(Self::Aadhaar),
            "pan" => Ok(Self::Pan),
            "face" => Ok(Self::Face),
            _ => Err(format!("Invalid document kind: {}. Use aadhaar, pan, or face.", s)),
        }
    }
}

/// An encoded photo held in memory as a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    pub kind: DocumentKind,
    data_url: String,
}

impl CapturedImage {
    /// Encode raw image bytes as a base64 data URL
    pub fn from_bytes(kind: DocumentKind, mime: &str, bytes: &[u8]) -> Self {
        Self {
            kind,
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }
    }

    /// Wrap an existing data URL (as produced by a canvas snapshot)
    pub fn from_data_url(kind: DocumentKind, data_url: impl Into<String>) -> Result<Self> {
        let data_url = data_url.into();
        if !data_url.starts_with("data:") || !data_url.contains(";base64,") {
            return Err(KycError::Media(format!(
                "Captured {} image is not a base64 data URL",
                kind
            )));
        }
        Ok(Self { kind, data_url })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// MIME type declared in the data URL header
    pub fn mime(&self) -> &str {
        self.data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split(";base64,").next())
            .unwrap_or("application/octet-stream")
    }

    /// Decode the payload back into raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = self.data_url.rsplit(',').next().unwrap_or_default();
        STANDARD
            .decode(payload)
            .map_err(|e| KycError::Media(format!("Invalid {} image payload: {}", self.kind, e)))
    }

    /// Approximate encoded size, for logging
    pub fn encoded_len(&self) -> usize {
        self.data_url.len()
    }
}

/// The most recent capture of each kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    pub aadhaar: Option<CapturedImage>,
    pub pan: Option<CapturedImage>,
    pub face: Option<CapturedImage>,
}

impl CaptureSet {
    /// Store an image, replacing any earlier capture of the same kind
    pub fn store(&mut self, image: CapturedImage) {
        let slot = match image.kind {
            DocumentKind::Aadhaar => &mut self.aadhaar,
            DocumentKind::Pan => &mut self.pan,
            DocumentKind::Face => &mut self.face,
        };
        *slot = Some(image);
    }

    pub fn get(&self, kind: DocumentKind) -> Option<&CapturedImage> {
        match kind {
            DocumentKind::Aadhaar => self.aadhaar.as_ref(),
            DocumentKind::Pan => self.pan.as_ref(),
            DocumentKind::Face => self.face.as_ref(),
        }
    }
}

/// Raw fields extracted server-side, keyed by backend field name
/// (`aadhaar_name`, `aadhaar_number`, `aadhaar_dob`, `pan_number`, `pan_name`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedDetails(BTreeMap<String, String>);

impl ExtractedDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Value for `key`, treating an empty string as missing
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtractedDetails {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One editable row on the review screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewField {
    pub label: String,
    pub value: String,
}

/// User-editable review form, always holding every label in [`REVIEW_FIELDS`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDetails {
    fields: Vec<ReviewField>,
}

impl ReviewDetails {
    /// Seed the form from extracted fields, substituting [`PLACEHOLDER`]
    pub fn from_extracted(details: &ExtractedDetails) -> Self {
        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| details.non_empty(key))
                .unwrap_or(PLACEHOLDER)
                .to_string()
        };

        let values = [
            pick(&["aadhaar_name", "pan_name"]),
            pick(&["aadhaar_number"]),
            pick(&["aadhaar_dob"]),
            pick(&["pan_number"]),
            pick(&["pan_name"]),
        ];

        Self {
            fields: REVIEW_FIELDS
                .iter()
                .zip(values)
                .map(|(label, value)| ReviewField {
                    label: label.to_string(),
                    value,
                })
                .collect(),
        }
    }

    pub fn fields(&self) -> &[ReviewField] {
        &self.fields
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| field.value.as_str())
    }

    /// Replace the value of an existing field
    ///
    /// Returns `false` when `label` is not a review field.
    pub fn set(&mut self, label: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.label == label) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Name to address the user by, if the form holds a real one
    pub fn display_name(&self) -> Option<String> {
        self.get(FIELD_FULL_NAME)
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != PLACEHOLDER)
            .map(str::to_string)
    }

    /// Label/value map as sent to `/kyc/update`
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|field| (field.label.clone(), serde_json::Value::String(field.value.clone())))
            .collect()
    }
}
