use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use clubnight_domain::{NewUser, User, ID};
use std::sync::atomic::AtomicI64;
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
    id_seq: AtomicI64,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            id_seq: AtomicI64::new(1),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &NewUser) -> anyhow::Result<User> {
        let user = user.clone().with_id(next_id(&self.id_seq));
        insert(&user, &self.users);
        Ok(user)
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        save(user, &self.users);
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        find(user_id, &self.users)
    }

    async fn find_by_phone(&self, phone: &str) -> Option<User> {
        find_by(&self.users, |user: &User| {
            user.phone.as_deref() == Some(phone)
        })
        .into_iter()
        .next()
    }

    async fn find_by_email(&self, email: &str) -> Option<User> {
        find_by(&self.users, |user: &User| {
            user.email.eq_ignore_ascii_case(email)
        })
        .into_iter()
        .next()
    }

    async fn find_reminder_eligible(&self) -> Vec<User> {
        find_by(&self.users, |user: &User| user.is_reminder_eligible())
    }
}
