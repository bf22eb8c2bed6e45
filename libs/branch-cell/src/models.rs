use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::{Document, StoreError};
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub color_theme: ColorTheme,
    pub contact: String,
    pub header_title: Option<String>,
    pub footer_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Branch {
    const COLLECTION: &'static str = "branches";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Branch {
    /// Header text shown for the branch, falling back to its name.
    pub fn display_title(&self) -> &str {
        self.header_title.as_deref().unwrap_or(&self.name)
    }
}

/// Closed set of branch color themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Emerald,
    Indigo,
    Rose,
    Orange,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 5] = [
        ColorTheme::Blue,
        ColorTheme::Emerald,
        ColorTheme::Indigo,
        ColorTheme::Rose,
        ColorTheme::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorTheme::Blue => "blue",
            ColorTheme::Emerald => "emerald",
            ColorTheme::Indigo => "indigo",
            ColorTheme::Rose => "rose",
            ColorTheme::Orange => "orange",
        }
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequest {
    pub name: String,
    pub location: String,
    pub color_theme: ColorTheme,
    pub contact: String,
    pub header_title: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub color_theme: Option<ColorTheme>,
    pub contact: Option<String>,
    pub header_title: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BranchError {
    #[error("Branch not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for BranchError {
    fn from(err: StoreError) -> Self {
        BranchError::DatabaseError(err.to_string())
    }
}

impl From<BranchError> for AppError {
    fn from(err: BranchError) -> Self {
        match err {
            BranchError::NotFound => AppError::NotFound(err.to_string()),
            BranchError::ValidationError(msg) => AppError::ValidationError(msg),
            BranchError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
