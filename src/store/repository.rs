//! Typed repository over the document store.
//!
//! Mutations are full-record writes through [`DocumentStore`]; after every
//! mutating call the handlers re-fetch the full collection rather than
//! patching client-side state. A record that fails to decode is logged and
//! skipped so one bad document cannot take a collection offline.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::{seed, DocumentStore, APPLICATIONS_PREFIX, MEMBERS_PREFIX, RULES_PREFIX, STATUS_PATH, USERS_PREFIX};
use crate::errors::AppError;
use crate::models::{
    AdminProvisioned, Application, CreateMemberRequest, CreateRuleRequest, Member, MemberRole,
    Rule, ServerStatus, SubmitApplicationRequest, User,
};

/// Repository for members, rules, admin principals and applications.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members, newest joiners last.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        let mut members: Vec<Member> = self
            .store
            .list(MEMBERS_PREFIX)
            .await?
            .into_iter()
            .filter_map(|(path, value)| decode_record(&path, value))
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        let path = format!("{}{}", MEMBERS_PREFIX, id);
        let value = self.store.get(&path).await?;
        Ok(value.and_then(|v| decode_record(&path, v)))
    }

    /// List members holding `role`.
    pub async fn members_by_role(&self, role: MemberRole) -> Result<Vec<Member>, AppError> {
        let members = self.list_members().await?;
        Ok(members.into_iter().filter(|m| m.role == role).collect())
    }

    /// Create a new member with a store-assigned random ID.
    pub async fn add_member(&self, request: &CreateMemberRequest) -> Result<Member, AppError> {
        let member = Member {
            id: Uuid::new_v4().to_string(),
            name: request.name.clone(),
            role: request.role,
            joined_at: Utc::now(),
            profile_image: request.profile_image.clone(),
            discord_username: request.discord_username.clone(),
            description: request.description.clone(),
        };

        let path = format!("{}{}", MEMBERS_PREFIX, member.id);
        self.store.put(&path, serde_json::to_value(&member)?).await?;
        Ok(member)
    }

    /// Delete a member. Removing an unknown ID is a silent no-op.
    pub async fn remove_member(&self, id: &str) -> Result<(), AppError> {
        let path = format!("{}{}", MEMBERS_PREFIX, id);
        self.store.remove(&path).await?;
        Ok(())
    }

    // ==================== RULE OPERATIONS ====================

    /// List all rules.
    pub async fn list_rules(&self) -> Result<Vec<Rule>, AppError> {
        let mut rules: Vec<Rule> = self
            .store
            .list(RULES_PREFIX)
            .await?
            .into_iter()
            .filter_map(|(path, value)| decode_record(&path, value))
            .collect();
        rules.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rules)
    }

    /// List rules in `category`.
    pub async fn rules_by_category(&self, category: &str) -> Result<Vec<Rule>, AppError> {
        let rules = self.list_rules().await?;
        Ok(rules
            .into_iter()
            .filter(|r| r.category.as_deref() == Some(category))
            .collect())
    }

    /// List only rules flagged important.
    pub async fn important_rules(&self) -> Result<Vec<Rule>, AppError> {
        let rules = self.list_rules().await?;
        Ok(rules.into_iter().filter(|r| r.important).collect())
    }

    /// Create a new rule with a store-assigned random ID.
    pub async fn add_rule(&self, request: &CreateRuleRequest) -> Result<Rule, AppError> {
        let rule = Rule {
            id: Uuid::new_v4().to_string(),
            title: request.title.clone(),
            description: request.description.clone(),
            category: request.category.clone(),
            important: request.important,
        };

        let path = format!("{}{}", RULES_PREFIX, rule.id);
        self.store.put(&path, serde_json::to_value(&rule)?).await?;
        Ok(rule)
    }

    /// Delete a rule. Removing an unknown ID is a silent no-op.
    pub async fn remove_rule(&self, id: &str) -> Result<(), AppError> {
        let path = format!("{}{}", RULES_PREFIX, id);
        self.store.remove(&path).await?;
        Ok(())
    }

    // ==================== ADMIN PRINCIPALS ====================

    /// Provision an admin principal at `users/{uid}`.
    ///
    /// Provisioning an email that already exists is a non-fatal notice,
    /// not an error: the existing record is left untouched.
    pub async fn provision_admin(&self, email: &str) -> Result<AdminProvisioned, AppError> {
        let users = self.store.list(USERS_PREFIX).await?;
        for (path, value) in users {
            if let Some(user) = decode_record::<User>(&path, value) {
                if user.email == email {
                    let uid = path.trim_start_matches(USERS_PREFIX).to_string();
                    return Ok(AdminProvisioned {
                        uid,
                        created: false,
                        message: "Admin user already exists".to_string(),
                    });
                }
            }
        }

        let uid = Uuid::new_v4().to_string();
        let user = User {
            email: email.to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };
        let path = format!("{}{}", USERS_PREFIX, uid);
        self.store.put(&path, serde_json::to_value(&user)?).await?;

        Ok(AdminProvisioned {
            uid,
            created: true,
            message: "Admin user provisioned".to_string(),
        })
    }

    // ==================== APPLICATIONS ====================

    /// Record a join application. World-writable by declared policy.
    pub async fn add_application(
        &self,
        request: &SubmitApplicationRequest,
    ) -> Result<Application, AppError> {
        let application = Application {
            id: Uuid::new_v4().to_string(),
            minecraft_username: request.minecraft_username.clone(),
            discord_username: request.discord_username.clone(),
            platforms: request.platforms.clone(),
            answer: request.answer.clone(),
            submitted_at: Utc::now(),
        };

        let path = format!("{}{}", APPLICATIONS_PREFIX, application.id);
        self.store
            .put(&path, serde_json::to_value(&application)?)
            .await?;
        Ok(application)
    }

    // ==================== SETUP ====================

    /// Whether the store holds any of the records the dashboard needs.
    pub async fn is_initialized(&self) -> Result<bool, AppError> {
        let status = self.store.get(STATUS_PATH).await?;
        let members = self.store.list(MEMBERS_PREFIX).await?;
        let rules = self.store.list(RULES_PREFIX).await?;
        Ok(status.is_some() || !members.is_empty() || !rules.is_empty())
    }

    /// Seed the store with the bundled defaults. Existing members and
    /// rules are replaced wholesale, so re-running the setup flow resets
    /// the collections instead of growing them.
    pub async fn seed_database(&self) -> Result<(), AppError> {
        let status = ServerStatus::seed(Utc::now());
        self.store
            .put(STATUS_PATH, serde_json::to_value(&status)?)
            .await?;

        self.clear_prefix(MEMBERS_PREFIX).await?;
        for request in seed::seed_members() {
            self.add_member(&request).await?;
        }

        self.clear_prefix(RULES_PREFIX).await?;
        for request in seed::seed_rules() {
            self.add_rule(&request).await?;
        }

        tracing::info!("Database seeded with bundled defaults");
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<(), AppError> {
        for (path, _) in self.store.list(prefix).await? {
            self.store.remove(&path).await?;
        }
        Ok(())
    }
}

/// Decode a stored document, skipping (with a log line) records that no
/// longer match the schema.
fn decode_record<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!("Skipping undecodable record at {}: {}", path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn add_and_list_members() {
        let repo = repo();

        let created = repo
            .add_member(&CreateMemberRequest {
                name: "Steve".to_string(),
                role: MemberRole::Member,
                profile_image: None,
                discord_username: None,
                description: None,
            })
            .await
            .unwrap();

        let members = repo.list_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, created.id);
    }

    #[tokio::test]
    async fn ids_are_collision_resistant() {
        let repo = repo();
        let request = CreateMemberRequest {
            name: "Alex".to_string(),
            role: MemberRole::Member,
            profile_image: None,
            discord_username: None,
            description: None,
        };

        // two adds in the same millisecond tick must not collide
        let first = repo.add_member(&request).await.unwrap();
        let second = repo.add_member(&request).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(repo.list_members().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn role_filters() {
        let repo = repo();
        for (name, role) in [
            ("LordKing", MemberRole::Owner),
            ("DragonSlayer", MemberRole::Leader),
            ("MasterBuilder", MemberRole::Member),
        ] {
            repo.add_member(&CreateMemberRequest {
                name: name.to_string(),
                role,
                profile_image: None,
                discord_username: None,
                description: None,
            })
            .await
            .unwrap();
        }

        let owners = repo.members_by_role(MemberRole::Owner).await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].name, "LordKing");
        assert_eq!(repo.members_by_role(MemberRole::Leader).await.unwrap().len(), 1);
        assert_eq!(repo.members_by_role(MemberRole::Member).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_unknown_id_is_silent_noop() {
        let repo = repo();
        repo.add_rule(&CreateRuleRequest {
            title: "No Griefing".to_string(),
            description: "d".to_string(),
            category: None,
            important: true,
        })
        .await
        .unwrap();

        repo.remove_rule("does-not-exist").await.unwrap();
        assert_eq!(repo.list_rules().await.unwrap().len(), 1);

        repo.remove_member("does-not-exist").await.unwrap();
        assert!(repo.list_members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rule_filters() {
        let repo = repo();
        for request in seed::seed_rules() {
            repo.add_rule(&request).await.unwrap();
        }

        let behavior = repo.rules_by_category("Behavior").await.unwrap();
        assert!(behavior.iter().all(|r| r.category.as_deref() == Some("Behavior")));
        assert!(!behavior.is_empty());

        let important = repo.important_rules().await.unwrap();
        assert!(important.iter().all(|r| r.important));
    }

    #[tokio::test]
    async fn provision_admin_twice_is_a_notice() {
        let repo = repo();

        let first = repo.provision_admin("admin@lordsmp.com").await.unwrap();
        assert!(first.created);

        let second = repo.provision_admin("admin@lordsmp.com").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.uid, first.uid);
    }

    #[tokio::test]
    async fn reseeding_resets_instead_of_growing() {
        let repo = repo();
        repo.seed_database().await.unwrap();
        let members = repo.list_members().await.unwrap().len();
        let rules = repo.list_rules().await.unwrap().len();

        // a hand-added record does not survive a reset either
        repo.add_member(&CreateMemberRequest {
            name: "Steve".to_string(),
            role: MemberRole::Member,
            profile_image: None,
            discord_username: None,
            description: None,
        })
        .await
        .unwrap();

        repo.seed_database().await.unwrap();
        let reseeded = repo.list_members().await.unwrap();
        assert_eq!(reseeded.len(), members);
        assert!(reseeded.iter().all(|m| m.name != "Steve"));
        assert_eq!(repo.list_rules().await.unwrap().len(), rules);
    }

    #[tokio::test]
    async fn seed_marks_store_initialized() {
        let repo = repo();
        assert!(!repo.is_initialized().await.unwrap());

        repo.seed_database().await.unwrap();
        assert!(repo.is_initialized().await.unwrap());
        assert!(!repo.list_members().await.unwrap().is_empty());
        assert!(!repo.list_rules().await.unwrap().is_empty());
    }
}
