//! `multipart/form-data` bodies for the write endpoints.
//!
//! [`FormData`] collects the raw parts; the per-entity forms pick their
//! fields out of it, validate them and produce the catalog inputs. A file
//! part with no bytes counts as "no file".

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::extract::Multipart;
use chrono::{NaiveDate, NaiveDateTime};
use marquee_catalog::{ActorInput, CategoryInput, CinemaInput, MovieInput};
use marquee_core::price::Price;
use marquee_core::storage::UploadedFile;
use marquee_core::types::{DbId, Timestamp};
use marquee_db::models::status::MovieStatus;
use validator::Validate;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Raw form
// ---------------------------------------------------------------------------

/// Text fields and non-empty file parts of a multipart body, by field name.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.push_file(name, UploadedFile::new(file_name, bytes.to_vec()));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.push_text(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.texts.entry(name.into()).or_default().push(value.into());
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        if !file.is_empty() {
            self.files.entry(name.into()).or_default().push(file);
        }
    }

    /// First value of `name`, trimmed. Blank counts as absent.
    fn optional(&self, name: &str) -> Option<String> {
        self.texts
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// First value of `name`, trimmed. Present but blank is returned as is
    /// so length validation can report it.
    fn required(&self, name: &str) -> AppResult<String> {
        self.texts
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim().to_string())
            .ok_or_else(|| AppError::BadRequest(format!("Missing field '{name}'")))
    }

    fn parsed<T>(&self, name: &str) -> AppResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(name)
            .map(|value| parse_field(name, &value, |raw| raw.parse()))
            .transpose()
    }

    fn required_parsed<T>(&self, name: &str) -> AppResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parsed(name)?
            .ok_or_else(|| AppError::BadRequest(format!("Missing field '{name}'")))
    }

    /// Every id given for `name`, as repeated fields or comma separated.
    fn ids(&self, name: &str) -> AppResult<Vec<DbId>> {
        let Some(values) = self.texts.get(name) else {
            return Ok(Vec::new());
        };
        values
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_field(name, raw, |raw| raw.parse::<DbId>()))
            .collect()
    }

    fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files
            .remove(name)
            .and_then(|files| files.into_iter().next())
    }

    fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

fn parse_field<T, E: Display>(
    name: &str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, E>,
) -> AppResult<T> {
    parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid value for '{name}': {e}")))
}

/// Accepts RFC 3339 or an HTML `datetime-local` value, read as UTC.
fn parse_timestamp(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&chrono::Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

#[derive(Debug, Validate)]
pub struct MovieForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    /// At most 10000.00.
    #[validate(range(min = 0, max = 1000000))]
    pub price_cents: i64,
    pub status: MovieStatus,
    pub release_date_time: Timestamp,
    #[validate(range(min = 1, max = 500))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 1))]
    pub category_id: DbId,
    #[validate(range(min = 1))]
    pub cinema_id: DbId,
    pub actor_ids: Vec<DbId>,
    pub poster: Option<UploadedFile>,
    pub gallery: Vec<UploadedFile>,
}

impl MovieForm {
    /// Read and validate a movie form. The poster part is `poster`, gallery
    /// parts are `gallery`, cast ids are `actor_ids`.
    pub fn read(mut form: FormData) -> AppResult<Self> {
        let price: Price = form.required_parsed("price")?;
        let release = form.required("release_date_time")?;
        let parsed = Self {
            name: form.required("name")?,
            description: form.required("description")?,
            price_cents: price.cents(),
            status: form.required_parsed("status")?,
            release_date_time: parse_field("release_date_time", &release, parse_timestamp)?,
            duration_minutes: form.parsed("duration_minutes")?,
            category_id: form.required_parsed("category_id")?,
            cinema_id: form.required_parsed("cinema_id")?,
            actor_ids: form.ids("actor_ids")?,
            poster: form.take_file("poster"),
            gallery: form.take_files("gallery"),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn into_input(self) -> AppResult<MovieInput> {
        Ok(MovieInput {
            name: self.name,
            description: self.description,
            price: Price::from_cents(self.price_cents)?,
            status: self.status,
            release_date_time: self.release_date_time,
            duration_minutes: self.duration_minutes,
            category_id: self.category_id,
            cinema_id: self.cinema_id,
            actor_ids: self.actor_ids,
            poster: self.poster,
            gallery: self.gallery,
        })
    }
}

// ---------------------------------------------------------------------------
// Category, cinema, actor
// ---------------------------------------------------------------------------

#[derive(Debug, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub image: Option<UploadedFile>,
}

impl CategoryForm {
    pub fn read(mut form: FormData) -> AppResult<Self> {
        let parsed = Self {
            name: form.required("name")?,
            image: form.take_file("image"),
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

impl From<CategoryForm> for CategoryInput {
    fn from(form: CategoryForm) -> Self {
        Self {
            name: form.name,
            image: form.image,
        }
    }
}

#[derive(Debug, Validate)]
pub struct CinemaForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    pub logo: Option<UploadedFile>,
}

impl CinemaForm {
    pub fn read(mut form: FormData) -> AppResult<Self> {
        let parsed = Self {
            name: form.required("name")?,
            description: form.optional("description"),
            address: form.optional("address"),
            logo: form.take_file("logo"),
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

impl From<CinemaForm> for CinemaInput {
    fn from(form: CinemaForm) -> Self {
        Self {
            name: form.name,
            description: form.description,
            address: form.address,
            logo: form.logo,
        }
    }
}

#[derive(Debug, Validate)]
pub struct ActorForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture: Option<UploadedFile>,
}

impl ActorForm {
    /// `date_of_birth` is `YYYY-MM-DD`.
    pub fn read(mut form: FormData) -> AppResult<Self> {
        let parsed = Self {
            name: form.required("name")?,
            bio: form.optional("bio"),
            date_of_birth: form.parsed("date_of_birth")?,
            profile_picture: form.take_file("profile_picture"),
        };
        parsed.validate()?;
        Ok(parsed)
    }
}

impl From<ActorForm> for ActorInput {
    fn from(form: ActorForm) -> Self {
        Self {
            name: form.name,
            bio: form.bio,
            date_of_birth: form.date_of_birth,
            profile_picture: form.profile_picture,
        }
    }
}
