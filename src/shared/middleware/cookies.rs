use axum_extra::extract::cookie::{Cookie, SameSite};

/// Cookie names of the cookie-path credential pair. Set together on
/// sign-in, cleared together on sign-out or any session invalidation.
pub const REFRESH_COOKIE: &str = "refreshToken";
pub const DEVICE_COOKIE: &str = "deviceId";

fn base_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

/// Both session cookies with max-age equal to the refresh-token lifetime
pub fn session_cookies(
    refresh_token: &str,
    device_id: &str,
    max_age_secs: i64,
) -> [Cookie<'static>; 2] {
    let max_age = time::Duration::seconds(max_age_secs);

    let mut refresh = base_cookie(REFRESH_COOKIE, refresh_token.to_string());
    refresh.set_max_age(max_age);

    let mut device = base_cookie(DEVICE_COOKIE, device_id.to_string());
    device.set_max_age(max_age);

    [refresh, device]
}

/// Expired replacements that remove both cookies client-side
pub fn clear_session_cookies() -> [Cookie<'static>; 2] {
    let mut refresh = base_cookie(REFRESH_COOKIE, String::new());
    refresh.set_max_age(time::Duration::ZERO);

    let mut device = base_cookie(DEVICE_COOKIE, String::new());
    device.set_max_age(time::Duration::ZERO);

    [refresh, device]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookies_share_attributes_and_max_age() {
        let [refresh, device] = session_cookies("tok", "dev", 1209600);

        for cookie in [&refresh, &device] {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Strict));
            assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1209600)));
        }
        assert_eq!(refresh.name(), REFRESH_COOKIE);
        assert_eq!(device.name(), DEVICE_COOKIE);
    }

    #[test]
    fn clearing_cookies_zeroes_value_and_age() {
        for cookie in clear_session_cookies() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
    }
}
