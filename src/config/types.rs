use serde::{Deserialize, Serialize};

/// Language-model endpoint settings. The key itself only ever comes from
/// the environment variable named by `api_key_env`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_model() -> String { "gpt-4".to_string() }
fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
const fn default_max_tokens() -> u32 { 4096 }
const fn default_temperature() -> f32 { 0.7 }
const fn default_oracle_timeout() -> u64 { 120 }

/// Build and test commands. `{class}` in `test_command` is replaced by the
/// test class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_compile_command")]
    pub compile_command: String,
    #[serde(default = "default_test_command")]
    pub test_command: String,
    #[serde(default = "default_build_timeout")]
    pub timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compile_command: default_compile_command(),
            test_command: default_test_command(),
            timeout_secs: default_build_timeout(),
        }
    }
}

fn default_compile_command() -> String { "mvn clean compile -DskipTests".to_string() }
fn default_test_command() -> String { "mvn -Dtest={class} test".to_string() }
const fn default_build_timeout() -> u64 { 900 }

/// Metrics tool invocation; `{input}` and `{output}` are scratch directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_command")]
    pub command: String,
    #[serde(default = "default_metrics_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            command: default_metrics_command(),
            timeout_secs: default_metrics_timeout(),
        }
    }
}

fn default_metrics_command() -> String {
    "java -jar DesigniteJava.jar -i {input} -o {output}".to_string()
}
const fn default_metrics_timeout() -> u64 { 300 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Append the previous attempt's failure to the next improve request.
    #[serde(default)]
    pub feed_back_failures: bool,
    /// Treat an unparseable judgment as an improvement.
    #[serde(default)]
    pub accept_malformed_judgment: bool,
    /// One direct refactor request per class, accepted when it builds and
    /// passes its tests. No assessment, judgment or commit.
    #[serde(default)]
    pub single_agent: bool,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            feed_back_failures: false,
            accept_malformed_judgment: false,
            single_agent: false,
        }
    }
}

const fn default_max_iterations() -> usize { 5 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// `{file}` is replaced by the project-relative path.
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    #[serde(default = "default_git_timeout")]
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            remote: default_remote(),
            branch: default_branch(),
            commit_message: default_commit_message(),
            timeout_secs: default_git_timeout(),
        }
    }
}

const fn default_true() -> bool { true }
fn default_remote() -> String { "origin".to_string() }
fn default_branch() -> String { "main".to_string() }
fn default_commit_message() -> String { "refagent: refactor {file}".to_string() }
const fn default_git_timeout() -> u64 { 120 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data: String,
    #[serde(default = "default_graphs_dir")]
    pub graphs: String,
    #[serde(default = "default_results_dir")]
    pub results: String,
    /// Regexes over project-relative paths that are never refactored.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: default_data_dir(),
            graphs: default_graphs_dir(),
            results: default_results_dir(),
            exclude: Vec::new(),
        }
    }
}

fn default_data_dir() -> String { "data/paths".to_string() }
fn default_graphs_dir() -> String { "data/graphs".to_string() }
fn default_results_dir() -> String { "results".to_string() }

/// The on-disk shape of `refagent.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefAgentToml {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub refactor: RefactorConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}
