//! Research toolbox
//!
//! Every tool the model may call is a [`ResearchTool`]: a typed argument struct
//! (which doubles as the JSON schema advertised to the model) plus an async
//! `call`. The [`ToolRegistry`] is the single source of truth pairing each
//! descriptor with its executor.

mod analyze;
mod finish;
mod linkedin;
mod registry;
mod result;
mod search;
mod web;

pub use analyze::AnalyzeWithLlm;
pub(crate) use analyze::strip_code_fence;
pub use finish::{Finish, FINISH_TOOL};
pub use linkedin::{
    GetLinkedInCompanyDetails, GetLinkedInCompanyPosts, GetLinkedInProfileData,
    GetLinkedInProfilePosts, GetLinkedInProfileReactions,
};
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use result::ToolResult;
pub use search::{SearchCompanyNews, SearchPersonNews, SearchWeb};
pub use web::BrowseWeb;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::agents::config::SamplingConfig;
use crate::agents::error::{AgentResult, ToolError};
use crate::agents::llm::LlmProvider;
use crate::domain::{BrowsePort, LinkedInPort, SearchPort};

/// Names of every tool the research loop must support
pub const CATALOG: [&str; 11] = [
    "finish",
    "get_linkedin_profile_data",
    "get_linkedin_profile_posts",
    "get_linkedin_profile_reactions",
    "get_linkedin_company_details",
    "get_linkedin_company_posts",
    "browse_web",
    "search_web",
    "search_company_news",
    "search_person_news",
    "analyze_with_llm",
];

/// Static description of a callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Build a descriptor whose parameters are derived from `A`
    pub fn for_args<A: JsonSchema>(name: &str, description: &str) -> Self {
        Self::new(name, description, parameters_schema::<A>())
    }

    /// Project into the function-calling shape of the completion API
    pub fn to_model_schema(&self) -> Value {
        // The API requires at minimum {"type": "object"} for parameters
        let parameters = match &self.parameters {
            Value::Object(map) if !map.is_empty() => {
                let mut map = map.clone();
                map.entry("type").or_insert_with(|| json!("object"));
                Value::Object(map)
            }
            _ => json!({ "type": "object", "properties": {}, "required": [] }),
        };

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": parameters,
            }
        })
    }
}

/// JSON schema for an argument struct, without the `$schema` and `title` noise
pub fn parameters_schema<A: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(A);
    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({}));
    if let Some(map) = value.as_object_mut() {
        map.remove("$schema");
        map.remove("title");
    }
    value
}

/// A tool with a typed argument contract
#[async_trait]
pub trait ResearchTool: Send + Sync + 'static {
    /// Argument struct; its schema is what the model sees
    type Args: DeserializeOwned + JsonSchema + Send;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run the tool. Ordinary failures are returned as `ToolResult::error`.
    async fn call(&self, args: Self::Args) -> ToolResult;
}

/// Object-safe executor contract used by the registry
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    /// Validate `args` and run. `Err` is reserved for dispatcher-level faults.
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// Adapter from a [`ResearchTool`] to a [`ToolExecutor`], owning argument validation
pub struct Typed<T>(pub T);

#[async_trait]
impl<T: ResearchTool> ToolExecutor for Typed<T> {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::for_args::<T::Args>(self.0.name(), self.0.description())
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let args: T::Args =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
                tool: self.0.name().to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.0.call(args).await)
    }
}

/// Display metadata shown to the caller when a tool starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMetadata {
    pub title: String,
    pub description: String,
}

/// Title and activity line for a tool name; unknown names get a derived title
pub fn metadata_for(name: &str) -> ToolMetadata {
    let known = match name {
        "get_linkedin_profile_data" => Some((
            "Linkedin Profile Data",
            "Fetching detailed profile information from LinkedIn",
        )),
        "get_linkedin_profile_posts" => Some((
            "Linkedin Profile Posts",
            "Retrieving recent posts and activities from the profile",
        )),
        "get_linkedin_profile_reactions" => Some((
            "Linkedin Profile Reactions",
            "Analyzing post reactions and engagement patterns",
        )),
        "get_linkedin_company_details" => Some((
            "Linkedin Company Details",
            "Gathering comprehensive company information",
        )),
        "get_linkedin_company_posts" => Some((
            "Linkedin Company Posts",
            "Collecting recent company updates and announcements",
        )),
        "browse_web" => Some(("Browse Web", "Extracting information from web pages")),
        "analyze_with_llm" => Some((
            "Analyze With LLM",
            "Processing and analyzing collected data with AI",
        )),
        "search_web" => Some(("Search Web", "Searching the web for relevant information")),
        "search_company_news" => Some((
            "Search Company News",
            "Finding latest news and updates about the company",
        )),
        "search_person_news" => Some((
            "Search Person News",
            "Discovering recent news mentions and articles",
        )),
        "finish" => Some(("Finish", "Completing research and generating final assessment")),
        _ => None,
    };

    match known {
        Some((title, description)) => ToolMetadata {
            title: title.to_string(),
            description: description.to_string(),
        },
        None => ToolMetadata {
            title: title_case(name),
            description: format!("Executing {}", name),
        },
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collaborators the standard toolbox is wired to
#[derive(Clone)]
pub struct ToolBackends {
    pub linkedin: Arc<dyn LinkedInPort>,
    pub search: Arc<dyn SearchPort>,
    pub browser: Arc<dyn BrowsePort>,
    /// Model used by `analyze_with_llm` and the news relevance filters
    pub analyst: Arc<dyn LlmProvider>,
    pub analysis: SamplingConfig,
}

impl ToolRegistry {
    /// Build the registry holding the full catalog, failing fast on any mismatch
    pub fn standard(backends: ToolBackends) -> AgentResult<ToolRegistry> {
        let analyst = AnalyzeWithLlm::new(backends.analyst, backends.analysis);

        ToolRegistry::builder()
            .register(Finish)
            .register(GetLinkedInProfileData::new(backends.linkedin.clone()))
            .register(GetLinkedInProfilePosts::new(backends.linkedin.clone()))
            .register(GetLinkedInProfileReactions::new(backends.linkedin.clone()))
            .register(GetLinkedInCompanyDetails::new(backends.linkedin.clone()))
            .register(GetLinkedInCompanyPosts::new(backends.linkedin))
            .register(BrowseWeb::new(backends.browser))
            .register(SearchWeb::new(backends.search.clone()))
            .register(SearchCompanyNews::new(backends.search.clone(), analyst.clone()))
            .register(SearchPersonNews::new(backends.search, analyst.clone()))
            .register(analyst)
            .build_for_catalog(&CATALOG)
    }
}
