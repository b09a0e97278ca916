pub(crate) mod actions;
pub(crate) mod auth;
pub(crate) mod gists;
pub(crate) mod meta;
pub(crate) mod search;
pub(crate) mod shared;
