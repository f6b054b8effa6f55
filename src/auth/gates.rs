use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigError, RolesConfig};
use crate::errors::AppError;
use crate::services::RolesHelpers;

/// A set of role or permission slugs. `a|b` matches any, `a,b` requires all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugSet {
    pub slugs: Vec<String>,
    pub require_all: bool,
}

impl SlugSet {
    fn parse(id: &str, arg: &str) -> Result<Self, ConfigError> {
        let require_all = arg.contains(',');
        let slugs: Vec<String> = arg
            .split(['|', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if slugs.is_empty() {
            return Err(ConfigError::MissingArgument(id.to_string()));
        }
        Ok(Self { slugs, require_all })
    }

    fn matches(&self, held: &[String]) -> bool {
        let has = |slug: &String| held.iter().any(|h| h == slug);
        if self.require_all {
            self.slugs.iter().all(has)
        } else {
            self.slugs.iter().any(has)
        }
    }
}

/// One named middleware from `roles.gui_middleware`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Auth,
    Role(SlugSet),
    Permission(SlugSet),
    Level(i32),
}

impl FromStr for Gate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        let (name, arg) = match id.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (id, None),
        };
        match (name, arg) {
            ("auth", None) => Ok(Gate::Auth),
            ("role", Some(arg)) => Ok(Gate::Role(SlugSet::parse(id, arg)?)),
            ("permission", Some(arg)) => Ok(Gate::Permission(SlugSet::parse(id, arg)?)),
            ("level", Some(arg)) => arg
                .parse::<i32>()
                .map(Gate::Level)
                .map_err(|_| ConfigError::InvalidLevel(id.to_string())),
            ("role" | "permission" | "level", None) => Err(ConfigError::MissingArgument(id.to_string())),
            _ => Err(ConfigError::UnknownMiddleware(id.to_string())),
        }
    }
}

impl fmt::Display for SlugSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.require_all { "," } else { "|" };
        f.write_str(&self.slugs.join(sep))
    }
}

/// Renders the identifier the gate was parsed from, normalised.
impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Auth => f.write_str("auth"),
            Gate::Role(set) => write!(f, "role:{set}"),
            Gate::Permission(set) => write!(f, "permission:{set}"),
            Gate::Level(min) => write!(f, "level:{min}"),
        }
    }
}

impl Gate {
    /// Whether the session user passes this gate. No user never passes.
    pub async fn allows(&self, helpers: &dyn RolesHelpers, user_id: Option<i64>) -> Result<bool, AppError> {
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        let allowed = match self {
            Gate::Auth => true,
            Gate::Role(set) => set.matches(&helpers.user_role_slugs(user_id).await?),
            Gate::Permission(set) => set.matches(&helpers.user_permission_slugs(user_id).await?),
            Gate::Level(min) => helpers.user_level(user_id).await? >= *min,
        };
        Ok(allowed)
    }
}

/// Gates attached to every permissions route, resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateChain {
    gates: Vec<Gate>,
}

impl GateChain {
    /// Parse the configured identifiers. Empty when custom middleware is disabled.
    pub fn from_config(config: &RolesConfig) -> Result<Self, ConfigError> {
        if !config.gui_middleware_enabled {
            return Ok(Self::default());
        }
        let gates = config
            .gui_middleware
            .identifiers()
            .iter()
            .map(|id| id.parse::<Gate>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { gates })
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MiddlewareSpec;
    use crate::models::permission::PermissionFillData;
    use crate::services::memory::MemoryRolesHelpers;

    #[test]
    fn test_parse_identifiers() {
        assert_eq!("auth".parse::<Gate>().unwrap(), Gate::Auth);
        assert_eq!("level:3".parse::<Gate>().unwrap(), Gate::Level(3));
        assert_eq!(
            "role:admin|editor".parse::<Gate>().unwrap(),
            Gate::Role(SlugSet {
                slugs: vec!["admin".to_string(), "editor".to_string()],
                require_all: false,
            })
        );
        assert_eq!(
            "permission:edit, publish".parse::<Gate>().unwrap(),
            Gate::Permission(SlugSet {
                slugs: vec!["edit".to_string(), "publish".to_string()],
                require_all: true,
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!(matches!("throttle:60".parse::<Gate>(), Err(ConfigError::UnknownMiddleware(_))));
        assert!(matches!("role".parse::<Gate>(), Err(ConfigError::MissingArgument(_))));
        assert!(matches!("role:|".parse::<Gate>(), Err(ConfigError::MissingArgument(_))));
        assert!(matches!("level:high".parse::<Gate>(), Err(ConfigError::InvalidLevel(_))));
    }

    #[test]
    fn test_display_normalises_identifier() {
        let gate: Gate = "permission: edit , publish".parse().unwrap();
        assert_eq!(gate.to_string(), "permission:edit,publish");
        let gate: Gate = "role:admin|editor".parse().unwrap();
        assert_eq!(gate.to_string(), "role:admin|editor");
        assert_eq!(Gate::Level(3).to_string(), "level:3");
        assert_eq!(Gate::Auth.to_string(), "auth");
    }

    #[test]
    fn test_chain_empty_when_disabled() {
        let config = RolesConfig {
            gui_middleware: MiddlewareSpec::One("bogus".to_string()),
            ..RolesConfig::default()
        };
        assert!(GateChain::from_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_chain_fails_on_unknown_when_enabled() {
        let config = RolesConfig {
            gui_middleware_enabled: true,
            gui_middleware: MiddlewareSpec::Many(vec!["role:admin".to_string(), "bogus".to_string()]),
            ..RolesConfig::default()
        };
        assert!(GateChain::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_gates_against_store() {
        let store = MemoryRolesHelpers::new();
        let admin = store.insert_role("Admin", "admin", 5);
        let editor = store.insert_role("Editor", "editor", 2);
        let ann = store.insert_user("Ann", "ann@example.com");
        store.assign_role(ann, editor);
        let p = store
            .create(&PermissionFillData {
                name: "Edit".to_string(),
                slug: "edit".to_string(),
                description: String::new(),
                model: "Permission".to_string(),
                roles: vec![editor],
            })
            .await
            .unwrap();
        store.grant_to_role(p.id, admin);

        let role_any: Gate = "role:admin|editor".parse().unwrap();
        let role_all: Gate = "role:admin,editor".parse().unwrap();
        let perm: Gate = "permission:edit".parse().unwrap();
        let level: Gate = "level:3".parse().unwrap();

        assert!(role_any.allows(&store, Some(ann)).await.unwrap());
        assert!(!role_all.allows(&store, Some(ann)).await.unwrap());
        assert!(perm.allows(&store, Some(ann)).await.unwrap());
        assert!(!level.allows(&store, Some(ann)).await.unwrap());
        assert!(!Gate::Auth.allows(&store, None).await.unwrap());
    }
}
