//! Server line rendering.
//!
//! Grammar of one line:
//!
//! ```text
//! server <server_name> <balancer_ip>:<balancer_port>[ cookie <server_name>][ <options>]
//! ```
//!
//! Fields are separated by single spaces. Options are appended verbatim and
//! dropped entirely when blank, so no line carries trailing whitespace.

use super::BalancerMemberRecord;

/// Per-request rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFormat {
    /// Append `cookie <server_name>` after the address.
    pub define_cookies: bool,
}

/// Renders the server line for one record, without a line terminator.
pub fn render_line(record: &BalancerMemberRecord, format: LineFormat) -> String {
    let mut line = format!(
        "server {} {}:{}",
        record.server_name, record.balancer_ip, record.balancer_port
    );

    if format.define_cookies {
        line.push_str(" cookie ");
        line.push_str(&record.server_name);
    }

    let options = record.options.trim();
    if !options.is_empty() {
        line.push(' ');
        line.push_str(options);
    }

    line
}

/// Renders every record in order into one fragment body, one
/// newline-terminated line per record.
pub fn render(records: &[BalancerMemberRecord], format: LineFormat) -> String {
    records.iter().fold(String::new(), |mut body, record| {
        body.push_str(&render_line(record, format));
        body.push('\n');
        body
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(options: &str) -> BalancerMemberRecord {
        BalancerMemberRecord {
            server_name: "server01".into(),
            balancer_ip: "192.168.56.200".into(),
            balancer_port: 8140,
            options: options.into(),
        }
    }

    #[test]
    fn line_with_options() {
        assert_eq!(
            render_line(&record("check"), LineFormat::default()),
            "server server01 192.168.56.200:8140 check"
        );
    }

    #[test]
    fn line_without_options_has_no_trailing_space() {
        assert_eq!(
            render_line(&record(""), LineFormat::default()),
            "server server01 192.168.56.200:8140"
        );
        assert_eq!(
            render_line(&record("   "), LineFormat::default()),
            "server server01 192.168.56.200:8140"
        );
    }

    #[test]
    fn options_are_kept_verbatim() {
        assert_eq!(
            render_line(&record("check inter 2000 rise 2 fall 5"), LineFormat::default()),
            "server server01 192.168.56.200:8140 check inter 2000 rise 2 fall 5"
        );
    }

    #[test]
    fn cookie_follows_address() {
        let format = LineFormat { define_cookies: true };

        assert_eq!(
            render_line(&record("check"), format),
            "server server01 192.168.56.200:8140 cookie server01 check"
        );
        assert_eq!(
            render_line(&record(""), format),
            "server server01 192.168.56.200:8140 cookie server01"
        );
    }

    #[test]
    fn body_keeps_record_order() {
        let mut second = record("backup");
        second.server_name = "server02".into();
        second.balancer_ip = "192.168.56.201".into();

        assert_eq!(
            render(&[record("check"), second], LineFormat::default()),
            "server server01 192.168.56.200:8140 check\n\
             server server02 192.168.56.201:8140 backup\n"
        );
    }

    #[test]
    fn no_records_render_empty_body() {
        assert_eq!(render(&[], LineFormat::default()), "");
    }
}
