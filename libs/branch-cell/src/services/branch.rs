use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::{AppState, Collection};

use crate::models::{Branch, BranchError, CreateBranchRequest, UpdateBranchRequest};

pub struct BranchService {
    branches: Collection<Branch>,
}

fn required(value: &str, field: &str) -> Result<String, BranchError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BranchError::ValidationError(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BranchService {
    pub fn new(state: &AppState) -> Self {
        Self {
            branches: state.db.collection(),
        }
    }

    pub async fn list_branches(&self) -> Vec<Branch> {
        self.branches.find_all().await
    }

    pub async fn get_branch(&self, branch_id: Uuid) -> Result<Branch, BranchError> {
        self.branches
            .find_by_id(branch_id)
            .await
            .ok_or(BranchError::NotFound)
    }

    pub async fn create_branch(&self, request: CreateBranchRequest) -> Result<Branch, BranchError> {
        debug!("Creating branch: {}", request.name);

        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4(),
            name: required(&request.name, "name")?,
            location: required(&request.location, "location")?,
            color_theme: request.color_theme,
            contact: required(&request.contact, "contact")?,
            header_title: optional_text(request.header_title),
            footer_text: optional_text(request.footer_text),
            created_at: now,
            updated_at: now,
        };

        let branch = self.branches.insert(branch).await?;
        info!("Branch {} created ({})", branch.id, branch.name);
        Ok(branch)
    }

    pub async fn update_branch(
        &self,
        branch_id: Uuid,
        request: UpdateBranchRequest,
    ) -> Result<Branch, BranchError> {
        debug!("Updating branch: {}", branch_id);

        let name = request.name.as_deref().map(|v| required(v, "name")).transpose()?;
        let location = request.location.as_deref().map(|v| required(v, "location")).transpose()?;
        let contact = request.contact.as_deref().map(|v| required(v, "contact")).transpose()?;

        let updated = self.branches
            .update(branch_id, |branch| {
                if let Some(name) = name {
                    branch.name = name;
                }
                if let Some(location) = location {
                    branch.location = location;
                }
                if let Some(contact) = contact {
                    branch.contact = contact;
                }
                if let Some(theme) = request.color_theme {
                    branch.color_theme = theme;
                }
                if request.header_title.is_some() {
                    branch.header_title = optional_text(request.header_title);
                }
                if request.footer_text.is_some() {
                    branch.footer_text = optional_text(request.footer_text);
                }
                branch.updated_at = Utc::now();
            })
            .await
            .ok_or(BranchError::NotFound)?;

        info!("Branch {} updated", updated.id);
        Ok(updated)
    }
}
