// Persistence of projects and responses.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ahp::*;

/// A survey project: its name and the ordered list of criteria.
///
/// The order of the criteria is the order of the rows and columns of every stored matrix,
/// and never changes once the project is registered.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub criteria: Vec<String>,
}

/// The evaluated response of one respondent.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub respondent: String,
    #[serde(rename = "consistencyRatio")]
    pub consistency_ratio: f64,
    pub matrix: Vec<Vec<f64>>,
    #[serde(rename = "exportPath")]
    pub export_path: Option<String>,
}

pub trait ResponseStore {
    /// Registers a project. Saving a project again replaces the previous record.
    fn save_project(&mut self, project: &Project) -> AhpResult<()>;

    fn load_project(&self, project_id: &str) -> AhpResult<Option<Project>>;

    fn save_response(&mut self, response: &Response) -> AhpResult<()>;

    /// All the responses of a project, ordered by respondent then id.
    fn list_responses(&self, project_id: &str) -> AhpResult<Vec<Response>>;
}

fn sort_responses(responses: &mut [Response]) {
    responses.sort_by(|a, b| {
        a.respondent
            .cmp(&b.respondent)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// A store keeping everything in memory, for the duration of a run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: BTreeMap<String, Project>,
    responses: Vec<Response>,
}

impl MemoryStore {
    pub fn projects(&self) -> Vec<Project> {
        self.projects.values().cloned().collect()
    }
}

impl ResponseStore for MemoryStore {
    fn save_project(&mut self, project: &Project) -> AhpResult<()> {
        self.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> AhpResult<Option<Project>> {
        Ok(self.projects.get(project_id).cloned())
    }

    fn save_response(&mut self, response: &Response) -> AhpResult<()> {
        self.responses.push(response.clone());
        Ok(())
    }

    fn list_responses(&self, project_id: &str) -> AhpResult<Vec<Response>> {
        let mut res: Vec<Response> = self
            .responses
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        sort_responses(&mut res);
        Ok(res)
    }
}

/// A store writing one JSON file per record:
///
/// ```text
/// <root>/projects/<project id>.json
/// <root>/responses/<response id>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the directories if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> AhpResult<JsonFileStore> {
        let root = root.as_ref().to_path_buf();
        for sub in ["projects", "responses"] {
            let p = root.join(sub);
            fs::create_dir_all(&p).context(StoreIoSnafu {
                path: p.display().to_string(),
            })?;
        }
        info!("Opened store at {}", root.display());
        Ok(JsonFileStore { root })
    }

    fn project_path(&self, project_id: &str) -> PathBuf {
        self.root
            .join("projects")
            .join(format!("{}.json", project_id))
    }

    fn response_path(&self, response_id: &str) -> PathBuf {
        self.root
            .join("responses")
            .join(format!("{}.json", response_id))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AhpResult<()> {
    let path_s = path.display().to_string();
    let js = serde_json::to_string_pretty(value).context(StoreJsonSnafu {
        path: path_s.clone(),
    })?;
    fs::write(path, js).context(StoreIoSnafu { path: path_s })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AhpResult<T> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(StoreIoSnafu {
        path: path_s.clone(),
    })?;
    serde_json::from_str(&contents).context(StoreJsonSnafu { path: path_s })
}

impl ResponseStore for JsonFileStore {
    fn save_project(&mut self, project: &Project) -> AhpResult<()> {
        validate_project_id(&project.id)?;
        write_json(&self.project_path(&project.id), project)
    }

    fn load_project(&self, project_id: &str) -> AhpResult<Option<Project>> {
        validate_project_id(project_id)?;
        let p = self.project_path(project_id);
        if !p.exists() {
            return Ok(None);
        }
        read_json(&p).map(Some)
    }

    fn save_response(&mut self, response: &Response) -> AhpResult<()> {
        let p = self.response_path(&response.id);
        debug!("save_response: writing {}", p.display());
        write_json(&p, response)
    }

    fn list_responses(&self, project_id: &str) -> AhpResult<Vec<Response>> {
        let dir = self.root.join("responses");
        let entries = fs::read_dir(&dir).context(StoreIoSnafu {
            path: dir.display().to_string(),
        })?;
        let mut res: Vec<Response> = Vec::new();
        for entry in entries {
            let entry = entry.context(StoreIoSnafu {
                path: dir.display().to_string(),
            })?;
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let r: Response = read_json(&p)?;
            if r.project_id == project_id {
                res.push(r);
            }
        }
        sort_responses(&mut res);
        Ok(res)
    }
}
