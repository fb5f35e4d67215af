//! Cipher module: persistent memory layer for context-aware assistance
//!
//! Generates `memAgent/cipher.yml` and registers the `cipher` MCP server
//! with the API keys it needs in its environment.

use clap::Args;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::InitConfig;
use crate::error::InitResult;
use crate::module::traits::{CliOptionSpec, McpModule, ModuleMetadata};
use crate::output::ServerEntry;

/// System prompt used when none is supplied
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an AI assistant with persistent memory across sessions.";

/// CLI flags contributed by the Cipher module
#[derive(Args, Debug, Clone, Default)]
pub struct CipherArgs {
    /// OpenAI API key for the Cipher LLM
    #[arg(long = "cipher-openai-key", value_name = "KEY")]
    pub cipher_openai_key: Option<String>,

    /// Anthropic API key for the Cipher LLM
    #[arg(long = "cipher-anthropic-key", value_name = "KEY")]
    pub cipher_anthropic_key: Option<String>,

    /// Embedding provider (openai, gemini, voyage, qwen, lmstudio, ollama, aws-bedrock, disabled)
    #[arg(long = "cipher-embedding", value_name = "PROVIDER")]
    pub cipher_embedding: Option<String>,

    /// API key for the embedding provider
    #[arg(long = "cipher-embedding-key", value_name = "KEY")]
    pub cipher_embedding_key: Option<String>,

    /// System prompt written into the Cipher configuration
    #[arg(long = "cipher-system-prompt", value_name = "PROMPT")]
    pub cipher_system_prompt: Option<String>,
}

/// Cipher's typed slice of the run configuration
#[derive(Debug, Clone, Default)]
pub struct CipherConfig {
    /// OpenAI API key (empty when unset)
    pub openai_key: String,
    /// Anthropic API key (empty when unset)
    pub anthropic_key: String,
    /// Embedding provider name (empty when unset)
    pub embedding: String,
    /// Embedding provider API key (empty when unset)
    pub embedding_key: String,
    /// System prompt (empty when unset)
    pub system_prompt: String,
}

impl From<CipherArgs> for CipherConfig {
    fn from(args: CipherArgs) -> Self {
        Self {
            openai_key: args.cipher_openai_key.unwrap_or_default(),
            anthropic_key: args.cipher_anthropic_key.unwrap_or_default(),
            embedding: args.cipher_embedding.unwrap_or_default(),
            embedding_key: args.cipher_embedding_key.unwrap_or_default(),
            system_prompt: args.cipher_system_prompt.unwrap_or_default(),
        }
    }
}

/// Embedding section of the generated `memAgent/cipher.yml`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmbeddingConfig {
    /// Provider type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Embedding model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Env-var reference for the API key (e.g. "$VOYAGE_API_KEY")
    #[serde(rename = "apiKey", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for local providers (lmstudio, ollama)
    #[serde(rename = "baseUrl", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Set when the provider is "disabled"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Environment variable name holding a provider's API key
pub fn embedding_env_var(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase().replace('-', "_"))
}

/// Embedding section for a provider name
pub fn embedding_config(provider: &str) -> EmbeddingConfig {
    let keyed = |kind: &str, model: &str| EmbeddingConfig {
        kind: Some(kind.to_string()),
        model: Some(model.to_string()),
        api_key: Some(format!("${}", embedding_env_var(kind))),
        base_url: None,
        disabled: None,
    };
    let local = |kind: &str, model: &str, base_url: &str| EmbeddingConfig {
        kind: Some(kind.to_string()),
        model: Some(model.to_string()),
        api_key: None,
        base_url: Some(base_url.to_string()),
        disabled: None,
    };

    match provider {
        "disabled" => EmbeddingConfig {
            kind: None,
            model: None,
            api_key: None,
            base_url: None,
            disabled: Some(true),
        },
        "openai" => keyed("openai", "text-embedding-3-small"),
        "gemini" => keyed("gemini", "gemini-embedding-001"),
        "voyage" => keyed("voyage", "voyage-3-large"),
        "qwen" => keyed("qwen", "text-embedding-v3"),
        "lmstudio" => local("lmstudio", "nomic-embed-text", "http://localhost:1234/v1"),
        "ollama" => local("ollama", "nomic-embed-text", "http://localhost:11434"),
        "aws-bedrock" => EmbeddingConfig {
            kind: Some("aws-bedrock".to_string()),
            model: Some("amazon.titan-embed-text-v2:0".to_string()),
            api_key: None,
            base_url: None,
            disabled: None,
        },
        other => keyed(other, "default"),
    }
}

/// Validate an API key's format for a provider (prefix checks only)
pub fn is_valid_api_key(key: &str, provider: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    match provider {
        "openai" => key.starts_with("sk-"),
        "anthropic" => key.starts_with("claude-") || key.starts_with("sk-ant-"),
        "voyage" => key.starts_with("vo-"),
        _ => true,
    }
}

/// Shape of the generated `memAgent/cipher.yml`
#[derive(Debug, Serialize)]
struct CipherYaml<'a> {
    llm: LlmSection<'a>,
    #[serde(rename = "systemPrompt")]
    system_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding: Option<EmbeddingConfig>,
}

#[derive(Debug, Serialize)]
struct LlmSection<'a> {
    provider: &'a str,
    model: &'a str,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

/// The Cipher integration module
#[derive(Debug, Default)]
pub struct CipherModule;

impl CipherModule {
    /// Create the module
    pub fn new() -> Self {
        Self
    }

    /// Collect the non-empty API keys as (env var, value) pairs.
    ///
    /// OpenAI and Anthropic keys first, then the embedding key under the
    /// provider's env var name.
    fn api_keys(&self, config: &InitConfig) -> Vec<(String, String)> {
        let cipher = &config.cipher;
        let mut keys = Vec::new();
        if !cipher.openai_key.is_empty() {
            keys.push(("OPENAI_API_KEY".to_string(), cipher.openai_key.clone()));
        }
        if !cipher.anthropic_key.is_empty() {
            keys.push(("ANTHROPIC_API_KEY".to_string(), cipher.anthropic_key.clone()));
        }
        if !cipher.embedding.is_empty() && !cipher.embedding_key.is_empty() {
            keys.push((
                embedding_env_var(&cipher.embedding),
                cipher.embedding_key.clone(),
            ));
        }
        keys
    }
}

impl McpModule for CipherModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            name: "cipher".to_string(),
            version: "1.0.0".to_string(),
            description: "Persistent memory layer for context-aware AI assistance".to_string(),
            author: "mcpinit".to_string(),
        }
    }

    fn cli_options(&self) -> Vec<CliOptionSpec> {
        vec![
            CliOptionSpec::new("--cipher-openai-key", "OpenAI API key for the Cipher LLM")
                .with_value("KEY"),
            CliOptionSpec::new(
                "--cipher-anthropic-key",
                "Anthropic API key for the Cipher LLM",
            )
            .with_value("KEY"),
            CliOptionSpec::new("--cipher-embedding", "Embedding provider")
                .with_value("PROVIDER")
                .with_default("openai"),
            CliOptionSpec::new("--cipher-embedding-key", "API key for the embedding provider")
                .with_value("KEY"),
            CliOptionSpec::new(
                "--cipher-system-prompt",
                "System prompt written into the Cipher configuration",
            )
            .with_value("PROMPT"),
        ]
    }

    fn validate_requirements(&self) -> Result<(), String> {
        which::which("node").map(|_| ()).map_err(|_| {
            "'node' not found on PATH (Cipher runs on Node.js: https://nodejs.org)".to_string()
        })
    }

    fn validate_config(&self, config: &InitConfig) -> Result<(), String> {
        let cipher = &config.cipher;

        if cipher.openai_key.is_empty() && cipher.anthropic_key.is_empty() {
            return Err(
                "At least one API key is required (--cipher-openai-key or --cipher-anthropic-key)"
                    .to_string(),
            );
        }
        if !cipher.openai_key.is_empty() && !is_valid_api_key(&cipher.openai_key, "openai") {
            return Err("Invalid OpenAI API key format (expected 'sk-' prefix)".to_string());
        }
        if !cipher.anthropic_key.is_empty()
            && !is_valid_api_key(&cipher.anthropic_key, "anthropic")
        {
            return Err(
                "Invalid Anthropic API key format (expected 'claude-' or 'sk-ant-' prefix)"
                    .to_string(),
            );
        }
        if !cipher.embedding_key.is_empty()
            && !is_valid_api_key(&cipher.embedding_key, &cipher.embedding)
        {
            return Err(format!(
                "Invalid {} API key format",
                cipher.embedding
            ));
        }
        Ok(())
    }

    fn generate_config_files(&self, project_path: &Path, config: &InitConfig) -> InitResult<()> {
        let cipher = &config.cipher;

        // OpenAI wins when both keys are present
        let (provider, model, api_key) = if !cipher.openai_key.is_empty() {
            ("openai", "gpt-4-turbo", "$OPENAI_API_KEY")
        } else {
            ("anthropic", "claude-3-5-sonnet-20241022", "$ANTHROPIC_API_KEY")
        };

        let system_prompt = if cipher.system_prompt.is_empty() {
            DEFAULT_SYSTEM_PROMPT
        } else {
            &cipher.system_prompt
        };

        let yaml = CipherYaml {
            llm: LlmSection {
                provider,
                model,
                api_key,
            },
            system_prompt,
            embedding: if cipher.embedding.is_empty() {
                None
            } else {
                Some(embedding_config(&cipher.embedding))
            },
        };

        let mem_agent_dir = project_path.join("memAgent");
        fs::create_dir_all(&mem_agent_dir)?;

        let config_file = mem_agent_dir.join("cipher.yml");
        fs::write(&config_file, serde_yaml::to_string(&yaml)?)?;
        tracing::info!("Created Cipher configuration: {}", config_file.display());
        Ok(())
    }

    fn mcp_json_section(&self, _project_path: &Path, config: &InitConfig) -> ServerEntry {
        let mut entry = ServerEntry::stdio("cipher").with_arg("--mode").with_arg("mcp");
        for (name, value) in self.api_keys(config) {
            entry = entry.with_env(name, value);
        }
        entry
    }

    fn env_variables(&self, config: &InitConfig) -> Vec<(String, String)> {
        self.api_keys(config)
    }

    fn setup_instructions(&self) -> Vec<String> {
        vec![
            "**Cipher** (persistent memory layer)".to_string(),
            String::new(),
            "1. Install Cipher globally (requires Node.js 20+):".to_string(),
            "   `npm install -g @byterover/cipher`".to_string(),
            "2. Put your real API keys in `.env`; `memAgent/cipher.yml` references them"
                .to_string(),
            "3. Adjust the system prompt in `memAgent/cipher.yml` to match your workflow"
                .to_string(),
        ]
    }

    fn default_config(&self) -> serde_json::Value {
        json!({
            "provider": "openai",
            "model": "gpt-4-turbo",
            "embedding": "openai",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(cipher: CipherConfig) -> InitConfig {
        InitConfig {
            project_name: "test-cipher-project".to_string(),
            language: "typescript".to_string(),
            cipher,
            ..Default::default()
        }
    }

    fn openai_config() -> InitConfig {
        config_with(CipherConfig {
            openai_key: "sk-fake-openai-key".to_string(),
            embedding: "openai".to_string(),
            system_prompt: "Test system prompt for Cipher".to_string(),
            ..Default::default()
        })
    }

    fn read_yaml(dir: &TempDir) -> serde_yaml::Value {
        let path = dir.path().join("memAgent").join("cipher.yml");
        serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_metadata() {
        let meta = CipherModule::new().metadata();
        assert_eq!(meta.name, "cipher");
        assert_eq!(meta.version, "1.0.0");
        assert!(!meta.description.is_empty());
    }

    #[test]
    fn test_cli_options() {
        let options = CipherModule::new().cli_options();
        assert!(options.len() >= 5);
        assert!(options.iter().any(|o| o.flag == "--cipher-openai-key"));
    }

    #[test]
    fn test_validate_requirements_error_mentions_node() {
        match CipherModule::new().validate_requirements() {
            Ok(()) => {}
            Err(error) => assert!(error.contains("node")),
        }
    }

    #[test]
    fn test_generate_config_files_openai() {
        let dir = TempDir::new().unwrap();
        CipherModule::new()
            .generate_config_files(dir.path(), &openai_config())
            .unwrap();

        let yaml = read_yaml(&dir);
        assert_eq!(yaml["llm"]["provider"], "openai");
        assert_eq!(yaml["llm"]["model"], "gpt-4-turbo");
        assert_eq!(yaml["llm"]["apiKey"], "$OPENAI_API_KEY");
        assert_eq!(yaml["systemPrompt"], "Test system prompt for Cipher");
    }

    #[test]
    fn test_generate_config_files_anthropic() {
        let dir = TempDir::new().unwrap();
        let config = config_with(CipherConfig {
            anthropic_key: "claude-fake-key".to_string(),
            system_prompt: "Anthropic test prompt".to_string(),
            ..Default::default()
        });

        CipherModule::new()
            .generate_config_files(dir.path(), &config)
            .unwrap();

        let yaml = read_yaml(&dir);
        assert_eq!(yaml["llm"]["provider"], "anthropic");
        assert_eq!(yaml["llm"]["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(yaml["llm"]["apiKey"], "$ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_generate_config_with_voyage_embedding() {
        let dir = TempDir::new().unwrap();
        let config = config_with(CipherConfig {
            openai_key: "sk-fake-key".to_string(),
            embedding: "voyage".to_string(),
            embedding_key: "vo-fake-key".to_string(),
            ..Default::default()
        });

        CipherModule::new()
            .generate_config_files(dir.path(), &config)
            .unwrap();

        let yaml = read_yaml(&dir);
        assert_eq!(yaml["embedding"]["type"], "voyage");
        assert_eq!(yaml["embedding"]["model"], "voyage-3-large");
        assert_eq!(yaml["embedding"]["apiKey"], "$VOYAGE_API_KEY");
    }

    #[test]
    fn test_generate_config_disabled_embedding() {
        let dir = TempDir::new().unwrap();
        let config = config_with(CipherConfig {
            openai_key: "sk-fake-key".to_string(),
            embedding: "disabled".to_string(),
            ..Default::default()
        });

        CipherModule::new()
            .generate_config_files(dir.path(), &config)
            .unwrap();

        let yaml = read_yaml(&dir);
        assert_eq!(yaml["embedding"]["disabled"], true);
    }

    #[test]
    fn test_generate_config_omits_embedding_when_unset() {
        let dir = TempDir::new().unwrap();
        let config = config_with(CipherConfig {
            anthropic_key: "claude-fake-key".to_string(),
            ..Default::default()
        });

        CipherModule::new()
            .generate_config_files(dir.path(), &config)
            .unwrap();

        let yaml = read_yaml(&dir);
        assert!(yaml.get("embedding").is_none());
    }

    #[test]
    fn test_mcp_json_section() {
        let dir = TempDir::new().unwrap();
        let entry = CipherModule::new().mcp_json_section(dir.path(), &openai_config());

        assert_eq!(entry.transport, "stdio");
        assert_eq!(entry.command, "cipher");
        assert_eq!(entry.args, vec!["--mode", "mcp"]);
        assert_eq!(
            entry.env.get("OPENAI_API_KEY"),
            Some(&"sk-fake-openai-key".to_string())
        );
    }

    #[test]
    fn test_env_variables_skip_empty_keys() {
        let env = CipherModule::new().env_variables(&openai_config());
        assert!(env.contains(&("OPENAI_API_KEY".to_string(), "sk-fake-openai-key".to_string())));
        assert!(!env.iter().any(|(name, _)| name == "ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_env_variables_include_embedding_key() {
        let config = config_with(CipherConfig {
            openai_key: "sk-fake".to_string(),
            embedding: "voyage".to_string(),
            embedding_key: "vo-fake".to_string(),
            ..Default::default()
        });

        let env = CipherModule::new().env_variables(&config);
        assert!(env.contains(&("VOYAGE_API_KEY".to_string(), "vo-fake".to_string())));
    }

    #[test]
    fn test_validate_config_valid() {
        let config = config_with(CipherConfig {
            openai_key: "sk-valid-key-1234567890".to_string(),
            ..Default::default()
        });
        assert!(CipherModule::new().validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_accepts_short_prefixed_key() {
        let config = config_with(CipherConfig {
            openai_key: "sk-test".to_string(),
            ..Default::default()
        });
        assert!(CipherModule::new().validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_no_api_keys() {
        let config = config_with(CipherConfig::default());
        let error = CipherModule::new().validate_config(&config).unwrap_err();
        assert!(error.contains("API key"));
    }

    #[test]
    fn test_validate_config_invalid_openai_key() {
        let config = config_with(CipherConfig {
            openai_key: "invalid-key-format".to_string(),
            ..Default::default()
        });
        let error = CipherModule::new().validate_config(&config).unwrap_err();
        assert!(error.contains("Invalid OpenAI API key"));
    }

    #[test]
    fn test_validate_config_invalid_anthropic_key() {
        let config = config_with(CipherConfig {
            anthropic_key: "not-a-claude-key".to_string(),
            ..Default::default()
        });
        let error = CipherModule::new().validate_config(&config).unwrap_err();
        assert!(error.contains("Anthropic"));
    }

    #[test]
    fn test_embedding_config_variations() {
        for provider in ["openai", "gemini", "voyage", "qwen", "lmstudio", "ollama"] {
            let config = embedding_config(provider);
            assert_eq!(config.kind.as_deref(), Some(provider));
            assert!(config.model.is_some());
            if matches!(provider, "lmstudio" | "ollama") {
                assert!(config.base_url.is_some());
                assert!(config.api_key.is_none());
            } else {
                assert!(config.api_key.is_some());
            }
        }
    }

    #[test]
    fn test_embedding_config_aws_bedrock_has_no_key() {
        let config = embedding_config("aws-bedrock");
        assert!(config.api_key.is_none());
        assert!(config.model.is_some());
    }

    #[test]
    fn test_embedding_env_var_names() {
        assert_eq!(embedding_env_var("openai"), "OPENAI_API_KEY");
        assert_eq!(embedding_env_var("anthropic"), "ANTHROPIC_API_KEY");
        assert_eq!(embedding_env_var("aws-bedrock"), "AWS_BEDROCK_API_KEY");
        assert_eq!(embedding_env_var("custom"), "CUSTOM_API_KEY");
    }

    #[test]
    fn test_default_config() {
        let defaults = CipherModule::new().default_config();
        assert_eq!(defaults["provider"], "openai");
        assert_eq!(defaults["model"], "gpt-4-turbo");
    }

    #[test]
    fn test_default_system_prompt_used_when_unset() {
        let dir = TempDir::new().unwrap();
        let config = config_with(CipherConfig {
            openai_key: "sk-fake".to_string(),
            ..Default::default()
        });

        CipherModule::new()
            .generate_config_files(dir.path(), &config)
            .unwrap();

        let yaml = read_yaml(&dir);
        assert_eq!(yaml["systemPrompt"], DEFAULT_SYSTEM_PROMPT);
    }
}
