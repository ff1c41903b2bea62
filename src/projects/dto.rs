use serde::Deserialize;

use crate::projects::repo_types::ProjectFields;

/// Request body for `POST /project/create`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub about: String,
    pub color: String,
    #[serde(default)]
    pub is_private: bool,
}

/// Request body for `POST /project/edit`.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub about: String,
    pub color: String,
    #[serde(default)]
    pub is_private: bool,
}

impl From<CreateProjectRequest> for ProjectFields {
    fn from(r: CreateProjectRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            about: r.about,
            color: r.color.trim().to_string(),
            is_private: r.is_private,
        }
    }
}

impl From<UpdateProjectRequest> for ProjectFields {
    fn from(r: UpdateProjectRequest) -> Self {
        Self {
            name: r.name.trim().to_string(),
            about: r.about,
            color: r.color.trim().to_string(),
            is_private: r.is_private,
        }
    }
}
