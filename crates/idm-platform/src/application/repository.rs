//! Application Repository

use async_trait::async_trait;
use idm_common::TenantDomain;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::shared::api_common::Page;
use crate::shared::error::{PlatformError, Result};
use crate::Application;

/// Error code for a second application with the same name in a tenant.
pub const APPLICATION_NAME_EXISTS: &str = "APPLICATION_NAME_EXISTS";

fn name_taken(name: &str) -> PlatformError {
    PlatformError::name_taken(APPLICATION_NAME_EXISTS, "Application", name)
}

/// Storage for applications, partitioned by tenant.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `PlatformError::Duplicate` when the id or the name is
    /// already used in the tenant.
    async fn insert(&self, application: &Application) -> Result<()>;

    async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> Result<Option<Application>>;

    async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> Result<Option<Application>>;

    /// Applications ordered by creation time.
    async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> Result<Page<Application>>;

    /// Store `application` if the stored version equals `application.version`
    /// and no other application in the tenant holds its name.
    /// Returns the stored copy with its version bumped.
    async fn update(&self, application: &Application) -> Result<Application>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> Result<bool>;
}

/// In-memory application store.
#[derive(Default)]
pub struct InMemoryApplicationRepository {
    tenants: RwLock<HashMap<TenantDomain, HashMap<Uuid, Application>>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<()> {
        let mut tenants = self.tenants.write();
        let apps = tenants.entry(application.tenant_domain.clone()).or_default();

        if apps.contains_key(&application.id) {
            return Err(PlatformError::duplicate(
                "Application",
                "id",
                application.id.to_string(),
            ));
        }
        if apps.values().any(|a| a.name == application.name) {
            return Err(name_taken(&application.name));
        }

        apps.insert(application.id, application.clone());
        Ok(())
    }

    async fn find_by_id(&self, tenant: &TenantDomain, id: Uuid) -> Result<Option<Application>> {
        Ok(self
            .tenants
            .read()
            .get(tenant)
            .and_then(|apps| apps.get(&id))
            .cloned())
    }

    async fn find_by_name(&self, tenant: &TenantDomain, name: &str) -> Result<Option<Application>> {
        Ok(self
            .tenants
            .read()
            .get(tenant)
            .and_then(|apps| apps.values().find(|a| a.name == name))
            .cloned())
    }

    async fn list(&self, tenant: &TenantDomain, offset: usize, limit: usize) -> Result<Page<Application>> {
        let mut all: Vec<Application> = self
            .tenants
            .read()
            .get(tenant)
            .map(|apps| apps.values().cloned().collect())
            .unwrap_or_default();

        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(Page::slice(all, offset, limit))
    }

    async fn update(&self, application: &Application) -> Result<Application> {
        let mut tenants = self.tenants.write();
        let apps = tenants
            .get_mut(&application.tenant_domain)
            .ok_or_else(|| PlatformError::not_found("Application", application.id.to_string()))?;

        if apps
            .values()
            .any(|a| a.id != application.id && a.name == application.name)
        {
            return Err(name_taken(&application.name));
        }

        let stored = apps
            .get_mut(&application.id)
            .ok_or_else(|| PlatformError::not_found("Application", application.id.to_string()))?;

        if stored.version != application.version {
            return Err(PlatformError::ConcurrentModification {
                entity_type: "Application".to_string(),
                id: application.id.to_string(),
            });
        }

        let mut next = application.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, tenant: &TenantDomain, id: Uuid) -> Result<bool> {
        Ok(self
            .tenants
            .write()
            .get_mut(tenant)
            .map(|apps| apps.remove(&id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(name: &str) -> TenantDomain {
        TenantDomain::parse(name).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let app = Application::new(tenant("acme.io"), "portal");
            repo.insert(&app).await.unwrap();

            let found = repo.find_by_id(&tenant("acme.io"), app.id).await.unwrap();
            assert_eq!(found, Some(app.clone()));

            let by_name = repo.find_by_name(&tenant("acme.io"), "portal").await.unwrap();
            assert_eq!(by_name.map(|a| a.id), Some(app.id));

            assert!(repo.insert(&app).await.is_err());
        });
    }

    #[test]
    fn test_names_are_unique_per_tenant() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let portal = Application::new(tenant("acme.io"), "portal");
            repo.insert(&portal).await.unwrap();

            let err = repo
                .insert(&Application::new(tenant("acme.io"), "portal"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                PlatformError::Duplicate { ref code, ref field, .. }
                    if code == APPLICATION_NAME_EXISTS && field == "name"
            ));

            // Free in another tenant
            repo.insert(&Application::new(tenant("other.io"), "portal"))
                .await
                .unwrap();

            // Renaming onto a taken name is refused, keeping one's own name is not
            let admin = Application::new(tenant("acme.io"), "admin");
            repo.insert(&admin).await.unwrap();
            let mut renamed = admin.clone();
            renamed.name = "portal".to_string();
            let err = repo.update(&renamed).await.unwrap_err();
            assert!(matches!(err, PlatformError::Duplicate { .. }));

            let mut same_name = admin.clone();
            same_name.description = Some("Back office".to_string());
            assert_eq!(repo.update(&same_name).await.unwrap().version, 1);

            assert_eq!(repo.list(&tenant("acme.io"), 0, 10).await.unwrap().total, 2);
        });
    }

    #[test]
    fn test_tenants_are_isolated() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let app = Application::new(tenant("acme.io"), "portal");
            repo.insert(&app).await.unwrap();

            assert!(repo.find_by_id(&tenant("other.io"), app.id).await.unwrap().is_none());
            assert!(repo.find_by_name(&tenant("other.io"), "portal").await.unwrap().is_none());
            assert_eq!(repo.list(&tenant("other.io"), 0, 10).await.unwrap().total, 0);
            assert!(!repo.delete(&tenant("other.io"), app.id).await.unwrap());
        });
    }

    #[test]
    fn test_update_checks_version() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let app = Application::new(TenantDomain::default(), "portal");
            repo.insert(&app).await.unwrap();

            let mut first = app.clone();
            first.saas_app = true;
            let stored = repo.update(&first).await.unwrap();
            assert_eq!(stored.version, 1);

            // Still carries version 0
            let mut stale = app.clone();
            stale.discoverable = true;
            let err = repo.update(&stale).await.unwrap_err();
            assert!(matches!(err, PlatformError::ConcurrentModification { .. }));

            let current = repo.find_by_id(&app.tenant_domain, app.id).await.unwrap().unwrap();
            assert!(current.saas_app);
            assert!(!current.discoverable);
        });
    }

    #[test]
    fn test_list_pages_in_creation_order() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let mut ids = Vec::new();
            for i in 0..5 {
                let mut app = Application::new(TenantDomain::default(), format!("app-{}", i));
                app.created_at = app.created_at + chrono::Duration::seconds(i);
                ids.push(app.id);
                repo.insert(&app).await.unwrap();
            }

            let page = repo.list(&TenantDomain::default(), 1, 2).await.unwrap();
            assert_eq!(page.total, 5);
            assert_eq!(page.items.iter().map(|a| a.id).collect::<Vec<_>>(), ids[1..3].to_vec());
        });
    }

    #[test]
    fn test_delete() {
        tokio_test::block_on(async {
            let repo = InMemoryApplicationRepository::new();
            let app = Application::new(TenantDomain::default(), "portal");
            repo.insert(&app).await.unwrap();

            assert!(repo.delete(&app.tenant_domain, app.id).await.unwrap());
            assert!(!repo.delete(&app.tenant_domain, app.id).await.unwrap());
            assert!(repo.find_by_id(&app.tenant_domain, app.id).await.unwrap().is_none());
        });
    }
}
