//! Built-in templates.
//!
//! Every service in the catalog ships a compose file here, plus the extra
//! files some services need (`caddy/Caddyfile`, `n8n/config`). Names follow
//! `<service>/<file>`, matching the catalog's `ConfigFileDef::template`.
//!
//! Compose files attach to the shared network created by the run, which is
//! declared `external` so `docker compose down` never removes it.
//!
//! # Structured templates
//!
//! `n8n/config` has no `content` field: the whole object is serialized and
//! rendered, producing a JSON file from one blueprint.

use serde_json::{Map, Value};
use tracing::debug;

use homelab_core::application::ports::{LoadError, TemplateLoader};

/// One compiled-in template.
struct Builtin {
    name: &'static str,
    source: Source,
}

enum Source {
    /// Plain text with declared variables.
    Text {
        content: &'static str,
        variables: &'static [(&'static str, &'static str)],
    },
    /// A JSON object used as-is as the raw template value.
    Structured(&'static str),
}

macro_rules! compose {
    ($services:literal) => {
        concat!(
            "services:\n",
            $services,
            "\nnetworks:\n  {{network}}:\n    external: true\n"
        )
    };
}

const COMMON: &[(&str, &str)] = &[
    ("image", "string"),
    ("container_name", "string"),
    ("network", "string"),
    ("install_dir", "string"),
];

static BUILTIN_TEMPLATES: &[Builtin] = &[
    // ── Core ─────────────────────────────────────────────────────────────────
    Builtin {
        name: "caddy/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  caddy:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "80:80"
      - "443:443"
      - "443:443/udp"
    volumes:
      - {{install_dir}}/Caddyfile:/etc/caddy/Caddyfile:ro
      - {{install_dir}}/data:/data
      - {{install_dir}}/config:/config
    networks:
      - {{network}}
"#
            ),
            variables: COMMON,
        },
    },
    Builtin {
        name: "caddy/Caddyfile",
        source: Source::Text {
            content: r#"{
    email admin@{{domain}}
}

{{domain}} {
    respond "homelab on {{ip}}"
}

{{site_blocks}}
"#,
            variables: &[
                ("domain", "string"),
                ("ip", "string"),
                ("site_blocks", "string"),
            ],
        },
    },
    Builtin {
        name: "portainer/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  portainer:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{port}}:9443"
    volumes:
      - /var/run/docker.sock:/var/run/docker.sock
      - {{install_dir}}/data:/data
    networks:
      - {{network}}
"#
            ),
            variables: COMMON,
        },
    },
    Builtin {
        name: "copyparty/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  copyparty:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{port}}:3923"
    volumes:
      - {{install_dir}}/files:/w
      - {{install_dir}}/config:/cfg
    networks:
      - {{network}}
"#
            ),
            variables: COMMON,
        },
    },
    // ── Optional ─────────────────────────────────────────────────────────────
    Builtin {
        name: "n8n/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  n8n:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{port}}:5678"
    environment:
      - N8N_HOST={{n8n_host}}
      - N8N_PROTOCOL=https
      - WEBHOOK_URL={{webhook_url}}
      - N8N_ENCRYPTION_KEY={{encryption_key}}
    volumes:
      - {{install_dir}}/config:/home/node/.n8n
    networks:
      - {{network}}
"#
            ),
            variables: &[
                ("n8n_host", "string"),
                ("webhook_url", "string"),
                ("encryption_key", "secret"),
            ],
        },
    },
    Builtin {
        name: "n8n/config",
        source: Source::Structured(
            r#"{
  "host": "{{n8n_host}}",
  "protocol": "https",
  "port": "{{port}}",
  "encryptionKey": "{{encryption_key}}",
  "webhookUrl": "{{webhook_url}}"
}"#,
        ),
    },
    Builtin {
        name: "postgresql/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  postgresql:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{ip}}:{{port}}:5432"
    environment:
      - POSTGRES_USER={{postgres_user}}
      - POSTGRES_PASSWORD={{postgres_password}}
      - POSTGRES_DB={{postgres_db}}
    volumes:
      - {{install_dir}}/data:/var/lib/postgresql/data
    networks:
      - {{network}}
"#
            ),
            variables: &[
                ("postgres_user", "string"),
                ("postgres_password", "secret"),
                ("postgres_db", "string"),
            ],
        },
    },
    Builtin {
        name: "redis/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  redis:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    command: redis-server --appendonly yes
    volumes:
      - {{install_dir}}/data:/data
    networks:
      - {{network}}
"#
            ),
            variables: COMMON,
        },
    },
    Builtin {
        name: "minio/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  minio:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    command: server /data --console-address ":9001"
    ports:
      - "{{port}}:9000"
      - "9001:9001"
    environment:
      - MINIO_ROOT_USER={{minio_root_user}}
      - MINIO_ROOT_PASSWORD={{minio_root_password}}
    volumes:
      - {{install_dir}}/data:/data
    networks:
      - {{network}}
"#
            ),
            variables: &[
                ("minio_root_user", "string"),
                ("minio_root_password", "secret"),
            ],
        },
    },
    Builtin {
        name: "outline/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  outline:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{port}}:3000"
    environment:
      - URL={{outline_url}}
      - DATABASE_URL={{database_url}}
      - REDIS_URL={{redis_url}}
      - SECRET_KEY={{secret_key}}
      - UTILS_SECRET={{utils_secret}}
      - PGSSLMODE=disable
      - FILE_STORAGE=local
    volumes:
      - {{install_dir}}/data:/var/lib/outline/data
    networks:
      - {{network}}
"#
            ),
            variables: &[
                ("outline_url", "string"),
                ("database_url", "secret"),
                ("redis_url", "string"),
                ("secret_key", "secret"),
                ("utils_secret", "secret"),
            ],
        },
    },
    Builtin {
        name: "uptime-kuma/docker-compose",
        source: Source::Text {
            content: compose!(
                r#"  uptime-kuma:
    image: {{image}}
    container_name: {{container_name}}
    restart: unless-stopped
    ports:
      - "{{port}}:3001"
    volumes:
      - {{install_dir}}/data:/app/data
    networks:
      - {{network}}
"#
            ),
            variables: COMMON,
        },
    },
];

/// [`TemplateLoader`] over the compiled-in templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplateLoader;

impl BuiltinTemplateLoader {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateLoader for BuiltinTemplateLoader {
    fn load(&self, name: &str) -> Result<Value, LoadError> {
        let builtin = BUILTIN_TEMPLATES
            .iter()
            .find(|t| t.name == name)
            .ok_or(LoadError::NotFound)?;
        debug!(template = name, "Loading builtin template");

        match &builtin.source {
            Source::Text { content, variables } => {
                let variables: Map<String, Value> = variables
                    .iter()
                    .map(|(var, ty)| (var.to_string(), Value::from(*ty)))
                    .collect();
                let mut raw = Map::new();
                raw.insert("content".into(), Value::from(*content));
                raw.insert("variables".into(), Value::Object(variables));
                Ok(Value::Object(raw))
            }
            Source::Structured(json) => {
                serde_json::from_str(json).map_err(|e| LoadError::InvalidFormat(e.to_string()))
            }
        }
    }

    fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_TEMPLATES.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelab_core::domain::{SERVICE_CATALOG, Template};

    #[test]
    fn every_catalog_file_has_a_builtin_template() {
        let loader = BuiltinTemplateLoader::new();
        for def in SERVICE_CATALOG {
            for file in def.config_files {
                assert!(
                    loader.load(file.template).is_ok(),
                    "missing builtin template {}",
                    file.template
                );
            }
        }
    }

    #[test]
    fn every_builtin_is_a_valid_template() {
        let loader = BuiltinTemplateLoader::new();
        for name in loader.available() {
            let raw = loader.load(&name).unwrap();
            Template::from_raw(&name, &raw).unwrap();
        }
    }

    #[test]
    fn structured_template_has_no_content_field() {
        let raw = BuiltinTemplateLoader::new().load("n8n/config").unwrap();

        assert!(raw.get("content").is_none());
        assert_eq!(raw["protocol"], "https");
    }

    #[test]
    fn compose_files_join_the_external_network() {
        let raw = BuiltinTemplateLoader::new()
            .load("redis/docker-compose")
            .unwrap();
        let content = raw["content"].as_str().unwrap();

        assert!(content.starts_with("services:\n  redis:"));
        assert!(content.ends_with("networks:\n  {{network}}:\n    external: true\n"));
    }

    #[test]
    fn unknown_name_is_not_found() {
        assert_eq!(
            BuiltinTemplateLoader::new().load("jellyfin/docker-compose"),
            Err(LoadError::NotFound)
        );
    }
}
