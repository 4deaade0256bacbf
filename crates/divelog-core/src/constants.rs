/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const DIVES_ROUTE_COMPONENT: &str = "dives";
pub const DIVES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", DIVES_ROUTE_COMPONENT);

pub const PHOTOS_ROUTE_COMPONENT: &str = "photos";
pub const PHOTOS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", PHOTOS_ROUTE_COMPONENT);

pub const USERS_ROUTE_COMPONENT: &str = "users";
pub const USERS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", USERS_ROUTE_COMPONENT);

/// Photo content types accepted at the upload boundary.
pub const ALLOWED_PHOTO_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/bmp"];
