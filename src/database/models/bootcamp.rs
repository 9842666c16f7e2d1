use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{check_text, is_valid_email, is_valid_url, ValidationErrors};
use crate::filter::{FieldKind, FieldSpec};
use crate::geo::{GeoPoint, GeocodeMatch};

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Fields usable in list filters and sorts
pub static BOOTCAMP_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldKind::Uuid),
    FieldSpec::new("user", "user_id", FieldKind::Uuid),
    FieldSpec::new("name", "name", FieldKind::Text),
    FieldSpec::new("slug", "slug", FieldKind::Text),
    FieldSpec::new("email", "email", FieldKind::Text),
    FieldSpec::new("averageRating", "average_rating", FieldKind::Float),
    FieldSpec::new("averageCost", "average_cost", FieldKind::Integer),
    FieldSpec::new("housing", "housing", FieldKind::Bool),
    FieldSpec::new("jobAssistance", "job_assistance", FieldKind::Bool),
    FieldSpec::new("jobGuarantee", "job_guarantee", FieldKind::Bool),
    FieldSpec::new("acceptGi", "accept_gi", FieldKind::Bool),
    FieldSpec::new("location.city", "city", FieldKind::Text),
    FieldSpec::new("location.state", "state", FieldKind::Text),
    FieldSpec::new("location.zipcode", "zipcode", FieldKind::Text),
    FieldSpec::new("location.country", "country", FieldKind::Text),
    FieldSpec::new("createdAt", "created_at", FieldKind::Timestamp),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

impl fmt::Display for Career {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Career {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Web Development" => Ok(Career::WebDevelopment),
            "Mobile Development" => Ok(Career::MobileDevelopment),
            "UI/UX" => Ok(Career::UiUx),
            "Data Science" => Ok(Career::DataScience),
            "Business" => Ok(Career::Business),
            "Other" => Ok(Career::Other),
            other => Err(format!("unknown career '{}'", other)),
        }
    }
}

/// GeoJSON point plus the address components the geocoder resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [0.0, 0.0],
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }
}

impl From<&GeocodeMatch> for Location {
    fn from(m: &GeocodeMatch) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [m.longitude, m.latitude],
            formatted_address: m.formatted_address.clone(),
            street: m.street.clone(),
            city: m.city.clone(),
            state: m.state.clone(),
            zipcode: m.zipcode.clone(),
            country: m.country.clone(),
        }
    }
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.coordinates[1], self.coordinates[0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Location,
    pub careers: Vec<Career>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    pub average_cost: Option<i32>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for create and partial update. `address` is write-only and
/// is resolved into `location`; ownership, photo and rating are never taken
/// from the body.
///
/// The optional contact fields and `averageCost` are double options: an absent
/// key leaves the stored value alone, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub careers: Option<Vec<Career>>,
    #[serde(default, deserialize_with = "nullable")]
    pub average_cost: Option<Option<i32>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

/// Present keys become `Some`, so `null` arrives as `Some(None)`
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BootcampInput {
    /// Trimmed address, if one was supplied
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

/// Embedded view used when a review shows its bootcamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootcampSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl Bootcamp {
    /// Unvalidated record owned by `owner`; location is filled in once the
    /// address resolves.
    pub fn new(owner: Uuid, input: BootcampInput) -> Self {
        let mut bootcamp = Self {
            id: Uuid::new_v4(),
            user: owner,
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            website: None,
            phone: None,
            email: None,
            location: Location::default(),
            careers: Vec::new(),
            average_rating: None,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_string(),
            housing: false,
            job_assistance: false,
            job_guarantee: false,
            accept_gi: false,
            created_at: Utc::now(),
        };
        bootcamp.merge(input);
        bootcamp
    }

    /// Field-level merge of a partial update. Call `validate` afterwards.
    pub fn merge(&mut self, input: BootcampInput) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
            self.slug = slugify(&self.name);
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if let Some(website) = input.website {
            self.website = website;
        }
        if let Some(phone) = input.phone {
            self.phone = phone;
        }
        if let Some(email) = input.email {
            self.email = email.map(|e| e.trim().to_string());
        }
        if let Some(careers) = input.careers {
            self.careers = careers;
        }
        if let Some(cost) = input.average_cost {
            self.average_cost = cost;
        }
        if let Some(v) = input.housing {
            self.housing = v;
        }
        if let Some(v) = input.job_assistance {
            self.job_assistance = v;
        }
        if let Some(v) = input.job_guarantee {
            self.job_guarantee = v;
        }
        if let Some(v) = input.accept_gi {
            self.accept_gi = v;
        }
    }

    pub fn validation_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        check_text(&mut errors, "name", &self.name, "Please add a name", Some((50, "Name can not be more than 50 characters")));
        check_text(
            &mut errors,
            "description",
            &self.description,
            "Please add a description",
            Some((500, "Description can not be more than 500 characters")),
        );
        if let Some(website) = &self.website {
            if !is_valid_url(website) {
                errors.add("website", "Please use a valid URL with HTTP or HTTPS");
            }
        }
        if let Some(phone) = &self.phone {
            if phone.chars().count() > 20 {
                errors.add("phone", "Phone number can not be longer than 20 characters");
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                errors.add("email", "Please add a valid email");
            }
        }
        if self.careers.is_empty() {
            errors.add("careers", "Please add at least one career");
        }
        if matches!(self.average_cost, Some(cost) if cost < 0) {
            errors.add("averageCost", "Average cost can not be negative");
        }

        errors
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.validation_errors().into_result()
    }

    pub fn summary(&self) -> BootcampSummary {
        BootcampSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// URL slug: lowercase alphanumerics separated by single hyphens
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
