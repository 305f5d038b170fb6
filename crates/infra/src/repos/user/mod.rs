mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;
use relance_domain::{User, ID};

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_many(&self, user_ids: &[ID]) -> anyhow::Result<Vec<User>>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
}

#[cfg(test)]
mod tests {
    use crate::Context;
    use relance_domain::User;

    #[tokio::test]
    async fn crud() {
        let ctx = Context::create_inmemory();

        let mut user = User::new("Ada".into());
        ctx.repos.users.insert(&user).await.expect("To insert user");

        let found = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(found.name, "Ada");
        assert_eq!(found.device_token, None);

        user.device_token = Some("token-1".into());
        ctx.repos.users.save(&user).await.expect("To save user");
        let found = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(found.device_token, Some("token-1".into()));

        let other = User::new("Grace".into());
        ctx.repos
            .users
            .insert(&other)
            .await
            .expect("To insert user");
        let found = ctx
            .repos
            .users
            .find_many(&[user.id.clone(), other.id.clone()])
            .await
            .expect("To find users");
        assert_eq!(found.len(), 2);

        assert!(ctx.repos.users.delete(&user.id).await.is_some());
        assert!(ctx.repos.users.find(&user.id).await.is_none());
    }
}
