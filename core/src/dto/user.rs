use crate::decode::{Decodable, DescriptorBuilder};

/// A user as embedded in feeds, threads and the inbox viewer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct User {
    pk: i64,
    username: String,
    full_name: String,
    is_private: bool,
    is_verified: bool,
    profile_pic_url: String,
}

impl User {
    pub fn pk(&self) -> i64 {
        self.pk
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn profile_pic_url(&self) -> &str {
        &self.profile_pic_url
    }
}

impl Decodable for User {
    const TAG: &'static str = "user";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .int("pk", |u, v| u.pk = v)
            .source("id")
            .string("username", |u, v| u.username = v)
            .string("full_name", |u, v| u.full_name = v)
            .optional()
            .boolean("is_private", |u, v| u.is_private = v)
            .optional()
            .boolean("is_verified", |u, v| u.is_verified = v)
            .optional()
            .string("profile_pic_url", |u, v| u.profile_pic_url = v)
            .optional()
            .identifier("pk")
    }
}
