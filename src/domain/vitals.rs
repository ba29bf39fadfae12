//! Patient vitals: raw form input and the normalized classifier request.
//!
//! `VitalsInput` is whatever the user typed. `NormalizedRequest` can only be
//! obtained through [`normalize`], so holding one proves every bound and the
//! systolic/diastolic ordering were checked.

use serde::{Deserialize, Serialize};

/// Inclusive bounds for each numeric vital.
pub const AGE_RANGE: (f64, f64) = (18.0, 100.0);
pub const HEIGHT_RANGE: (f64, f64) = (100.0, 250.0);
pub const WEIGHT_RANGE: (f64, f64) = (30.0, 200.0);
pub const SYSTOLIC_RANGE: (f64, f64) = (60.0, 250.0);
pub const DIASTOLIC_RANGE: (f64, f64) = (40.0, 150.0);

/// Raw record as entered in the form.
///
/// Numeric and categorical fields are kept as free text; booleans come from
/// toggles and cannot be malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalsInput {
    pub age: String,
    pub sex: String,
    pub height: String,
    pub weight: String,
    pub systolic: String,
    pub diastolic: String,
    pub cholesterol: String,
    pub glucose: String,
    pub smoker: bool,
    pub alcohol: bool,
    pub active: bool,
}

/// Biological sex, encoded the way the classifier was trained (female = 1, male = 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 1,
            Self::Male => 2,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "female" | "f" | "1" => Some(Self::Female),
            "male" | "m" | "2" => Some(Self::Male),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
        }
    }
}

/// Ordinal lab level used for cholesterol and glucose (1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Normal,
    AboveNormal,
    High,
}

impl Level {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::AboveNormal => 2,
            Self::High => 3,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "normal" | "1" => Some(Self::Normal),
            "above-normal" | "2" => Some(Self::AboveNormal),
            "high" | "well-above-normal" | "3" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::AboveNormal => write!(f, "Above normal"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Age,
    Sex,
    Height,
    Weight,
    Systolic,
    Diastolic,
    Cholesterol,
    Glucose,
}

impl Field {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::Height => "Height",
            Self::Weight => "Weight",
            Self::Systolic => "Systolic BP",
            Self::Diastolic => "Diastolic BP",
            Self::Cholesterol => "Cholesterol",
            Self::Glucose => "Glucose",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationReason {
    #[error("value is required")]
    Missing,

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("must be between {min} and {max}")]
    OutOfRange { min: f64, max: f64 },

    #[error("'{0}' is not a recognised option")]
    UnknownOption(String),

    #[error("must be greater than diastolic ({diastolic})")]
    NotAboveDiastolic { diastolic: f64 },
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

/// Fully validated request in the classifier's encoding.
///
/// Fields are private; the only constructor is [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    age: u8,
    sex: Sex,
    height_cm: u16,
    weight_kg: u16,
    systolic: u16,
    diastolic: u16,
    cholesterol: Level,
    glucose: Level,
    smoker: bool,
    alcohol: bool,
    active: bool,
}

/// JSON body sent to the remote classifier.
///
/// Field names follow the classifier's training columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    pub age_years: u8,
    pub gender: u8,
    pub height: u16,
    pub weight: u16,
    pub ap_hi: u16,
    pub ap_lo: u16,
    pub cholesterol: u8,
    pub gluc: u8,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,
}

impl NormalizedRequest {
    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    #[must_use]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    #[must_use]
    pub fn height_cm(&self) -> u16 {
        self.height_cm
    }

    #[must_use]
    pub fn weight_kg(&self) -> u16 {
        self.weight_kg
    }

    #[must_use]
    pub fn systolic(&self) -> u16 {
        self.systolic
    }

    #[must_use]
    pub fn diastolic(&self) -> u16 {
        self.diastolic
    }

    #[must_use]
    pub fn cholesterol(&self) -> Level {
        self.cholesterol
    }

    #[must_use]
    pub fn glucose(&self) -> Level {
        self.glucose
    }

    #[must_use]
    pub fn smoker(&self) -> bool {
        self.smoker
    }

    #[must_use]
    pub fn alcohol(&self) -> bool {
        self.alcohol
    }

    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Encode for the classifier (ordinals 1..=3, sex 1..=2, booleans 0/1).
    #[must_use]
    pub fn to_wire(&self) -> WirePayload {
        WirePayload {
            age_years: self.age,
            gender: self.sex.code(),
            height: self.height_cm,
            weight: self.weight_kg,
            ap_hi: self.systolic,
            ap_lo: self.diastolic,
            cholesterol: self.cholesterol.code(),
            gluc: self.glucose.code(),
            smoke: u8::from(self.smoker),
            alco: u8::from(self.alcohol),
            active: u8::from(self.active),
        }
    }
}

/// Parse a bounded numeric field. The value is kept as entered; rounding
/// happens once every rule has run.
fn parse_bounded(
    raw: &str,
    field: Field,
    (min, max): (f64, f64),
    errors: &mut Vec<ValidationError>,
) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::new(field, ValidationReason::Missing));
        return None;
    }

    let value = match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            errors.push(ValidationError::new(
                field,
                ValidationReason::NotANumber(trimmed.to_string()),
            ));
            return None;
        }
    };

    if !(min..=max).contains(&value) {
        errors.push(ValidationError::new(
            field,
            ValidationReason::OutOfRange { min, max },
        ));
        return None;
    }

    Some(value)
}

/// Round a bounded value to the nearest whole unit.
fn whole(value: f64) -> u16 {
    // Bounds are at most 250, so the rounded value always fits.
    value.round() as u16
}

fn parse_option<T>(
    raw: &str,
    field: Field,
    parse: fn(&str) -> Option<T>,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(ValidationError::new(field, ValidationReason::Missing));
        return None;
    }
    let parsed = parse(trimmed);
    if parsed.is_none() {
        errors.push(ValidationError::new(
            field,
            ValidationReason::UnknownOption(trimmed.to_string()),
        ));
    }
    parsed
}

/// Validate raw form input and convert it into a classifier request.
///
/// Every field is checked independently and all failures are returned at
/// once. The systolic > diastolic rule is only evaluated when both pressures
/// parsed and are within bounds; its error is attached to systolic.
///
/// # Errors
/// Returns one `ValidationError` per violated rule.
pub fn normalize(raw: &VitalsInput) -> Result<NormalizedRequest, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let age = parse_bounded(&raw.age, Field::Age, AGE_RANGE, &mut errors);
    let sex = parse_option(&raw.sex, Field::Sex, Sex::parse, &mut errors);
    let height = parse_bounded(&raw.height, Field::Height, HEIGHT_RANGE, &mut errors);
    let weight = parse_bounded(&raw.weight, Field::Weight, WEIGHT_RANGE, &mut errors);
    let systolic = parse_bounded(&raw.systolic, Field::Systolic, SYSTOLIC_RANGE, &mut errors);
    let diastolic = parse_bounded(&raw.diastolic, Field::Diastolic, DIASTOLIC_RANGE, &mut errors);
    let cholesterol = parse_option(&raw.cholesterol, Field::Cholesterol, Level::parse, &mut errors);
    let glucose = parse_option(&raw.glucose, Field::Glucose, Level::parse, &mut errors);

    if let (Some(sys), Some(dia)) = (systolic, diastolic) {
        if sys <= dia {
            errors.push(ValidationError::new(
                Field::Systolic,
                ValidationReason::NotAboveDiastolic { diastolic: dia },
            ));
        }
    }

    match (age, sex, height, weight, systolic, diastolic, cholesterol, glucose) {
        (
            Some(age),
            Some(sex),
            Some(height_cm),
            Some(weight_kg),
            Some(systolic),
            Some(diastolic),
            Some(cholesterol),
            Some(glucose),
        ) if errors.is_empty() => Ok(NormalizedRequest {
            // Age is bounded to 100.
            age: whole(age) as u8,
            sex,
            height_cm: whole(height_cm),
            weight_kg: whole(weight_kg),
            systolic: whole(systolic),
            diastolic: whole(diastolic),
            cholesterol,
            glucose,
            smoker: raw.smoker,
            alcohol: raw.alcohol,
            active: raw.active,
        }),
        _ => Err(errors),
    }
}
