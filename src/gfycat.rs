use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::config::{GfycatAuth, UploadConfig};
use crate::error::{ClipError, ClipResult};

/// Production API endpoints
const URL_API: &str = "https://api.gfycat.com/v1";
const URL_UPLOAD: &str = "https://filedrop.gfycat.com";
const URL_GFY: &str = "https://gfycat.com";
const URL_GFY_DIRECT: &str = "https://giant.gfycat.com";

/// Page URL for a finished gfy
pub fn gfy_page_url(gfyname: &str) -> String {
    format!("{}/{}", URL_GFY, gfyname)
}

/// Direct-media URL for a finished gfy
pub fn direct_media_url(gfyname: &str) -> String {
    format!("{}/{}.webm", URL_GFY_DIRECT, gfyname)
}

/// Which identity to authenticate with
#[derive(Debug, Clone, Copy)]
pub enum Identity<'a> {
    /// `client_credentials` grant
    Anonymous,
    /// `password` grant for a stored account
    User {
        username: &'a str,
        password: &'a str,
    },
}

/// Where an upload session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Authenticating,
    Creating,
    Uploading,
    Polling,
    Complete,
    Failed,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Authenticating => "authenticating",
            UploadState::Creating => "creating",
            UploadState::Uploading => "uploading",
            UploadState::Polling => "polling",
            UploadState::Complete => "complete",
            UploadState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// URLs for a successfully uploaded and encoded clip
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Resource name assigned by gfycat
    pub gfyname: String,
    /// Public page URL
    pub page_url: String,
    /// Direct link to the encoded media
    pub direct_url: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
}

// Remote responses are decoded into these tagged shapes once at the boundary;
// a body without the expected field falls through to the raw variant.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenReply {
    Granted { access_token: String },
    ServiceError(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateReply {
    Created { gfyname: String },
    ServiceError(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusReply {
    Status { task: String },
    ServiceError(serde_json::Value),
}

/// Client for the gfycat upload flow
///
/// Drives one session through authentication, slot creation, binary upload
/// and encode polling. Failure at any step is terminal; the caller decides
/// what to do with the local file.
pub struct GfycatClient {
    agent: ureq::Agent,
    api_url: String,
    upload_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl GfycatClient {
    /// Create a client against the production endpoints
    pub fn new(upload: &UploadConfig) -> Self {
        Self::with_endpoints(URL_API, URL_UPLOAD, upload)
    }

    /// Create a client against explicit endpoints
    pub fn with_endpoints(api_url: &str, upload_url: &str, upload: &UploadConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            agent,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs_f64(upload.poll_interval_secs),
            max_poll_attempts: upload.max_poll_attempts,
        }
    }

    /// Run a full upload session for the given local file
    ///
    /// The file is renamed to the assigned resource name before the transfer,
    /// so it must live in a directory this process owns.
    pub fn upload(
        &self,
        auth: &GfycatAuth,
        identity: Identity,
        clip_path: &Path,
    ) -> ClipResult<UploadOutcome> {
        let outcome = self.run_session(auth, identity, clip_path);
        if outcome.is_err() {
            debug!("upload state: {}", UploadState::Failed);
        }
        outcome
    }

    fn run_session(
        &self,
        auth: &GfycatAuth,
        identity: Identity,
        clip_path: &Path,
    ) -> ClipResult<UploadOutcome> {
        debug!("upload state: {}", UploadState::Authenticating);
        let token = self.authenticate(auth, identity)?;

        debug!("upload state: {}", UploadState::Creating);
        let gfyname = self.create_gfy(&token)?;
        info!("Uploading as {}", gfyname);

        debug!("upload state: {}", UploadState::Uploading);
        self.upload_file(&gfyname, clip_path)?;

        debug!("upload state: {}", UploadState::Polling);
        self.wait_for_encoding(&gfyname)?;

        debug!("upload state: {}", UploadState::Complete);
        Ok(UploadOutcome {
            page_url: gfy_page_url(&gfyname),
            direct_url: direct_media_url(&gfyname),
            gfyname,
        })
    }

    /// Exchange credentials for a bearer token
    pub fn authenticate(&self, auth: &GfycatAuth, identity: Identity) -> ClipResult<String> {
        let (grant_type, username, password) = match identity {
            Identity::Anonymous => ("client_credentials", None, None),
            Identity::User { username, password } => ("password", Some(username), Some(password)),
        };

        let payload = TokenRequest {
            grant_type,
            client_id: &auth.client_id,
            client_secret: &auth.client_secret,
            username,
            password,
        };

        let url = format!("{}/oauth/token", self.api_url);
        let mut response = self.agent.post(&url).send_json(&payload)?;

        match response.body_mut().read_json::<TokenReply>()? {
            TokenReply::Granted { access_token } => Ok(access_token),
            TokenReply::ServiceError(raw) => Err(ClipError::ServiceUnavailable(format!(
                "token response had no access_token: {}",
                raw
            ))),
        }
    }

    /// Request a new upload slot and return its resource name
    fn create_gfy(&self, token: &str) -> ClipResult<String> {
        let url = format!("{}/gfycats", self.api_url);
        let mut response = self
            .agent
            .post(&url)
            .header("authorization", format!("Bearer {}", token))
            .send_json(serde_json::json!({ "noMd5": "true" }))?;

        match response.body_mut().read_json::<CreateReply>()? {
            CreateReply::Created { gfyname } => Ok(gfyname),
            CreateReply::ServiceError(raw) => Err(ClipError::ServiceUnavailable(format!(
                "create response had no gfyname: {}",
                raw
            ))),
        }
    }

    /// Rename the local file to the resource name and PUT it to the filedrop
    fn upload_file(&self, gfyname: &str, clip_path: &Path) -> ClipResult<()> {
        let keyed_path = clip_path.with_file_name(gfyname);
        fs::rename(clip_path, &keyed_path)?;
        debug!("bound {} to {}", clip_path.display(), keyed_path.display());

        let url = format!("{}/{}", self.upload_url, gfyname);
        let file = File::open(&keyed_path)?;
        let response = self
            .agent
            .put(&url)
            .send(ureq::SendBody::from_owned_reader(file))?;

        if !response.status().is_success() {
            return Err(ClipError::Upload(format!(
                "filedrop returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Poll the encode status until it completes, fails, or the attempt
    /// budget runs out
    fn wait_for_encoding(&self, gfyname: &str) -> ClipResult<()> {
        let url = format!("{}/gfycats/fetch/status/{}", self.api_url, gfyname);

        for attempt in 1..=self.max_poll_attempts {
            let mut response = self.agent.get(&url).call()?;

            match response.body_mut().read_json::<StatusReply>()? {
                StatusReply::Status { task } => match task.as_str() {
                    "complete" => return Ok(()),
                    "encoding" => {
                        debug!("still encoding (attempt {})", attempt);
                        thread::sleep(self.poll_interval);
                    }
                    other => return Err(ClipError::RemoteProcessing(other.to_string())),
                },
                StatusReply::ServiceError(raw) => {
                    return Err(ClipError::ServiceUnavailable(format!(
                        "status response had no task: {}",
                        raw
                    )))
                }
            }
        }

        Err(ClipError::PollTimeout {
            attempts: self.max_poll_attempts,
        })
    }
}
