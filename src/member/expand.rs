//! Expansion of parallel parameter lists into member records.

use super::{BalancerMemberRequest, MemberError, OneOrMany};

/// One effective balancer member, rendered as one server line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancerMemberRecord {
    pub server_name: String,
    pub balancer_ip: String,
    pub balancer_port: u16,
    pub options: String,
}

/// Expands a request into its records.
///
/// `server_name` and `balancer_ip` are paired by position. A single value on
/// one side is repeated to match a list on the other; two lists must have the
/// same length. Options follow the same rule, except a list of length 1 also
/// counts as a single value. Records keep input order.
pub fn expand(request: &BalancerMemberRequest) -> Result<Vec<BalancerMemberRecord>, MemberError> {
    let count = match (request.server_name.list_len(), request.balancer_ip.list_len()) {
        (Some(server_names), Some(balancer_ips)) if server_names != balancer_ips => {
            return Err(MemberError::MismatchedArrayLength {
                resource: request.name.clone(),
                server_names,
                balancer_ips,
            });
        }
        (Some(count), _) | (None, Some(count)) => count,
        (None, None) => 1,
    };

    if let OneOrMany::Many(options) = &request.balancermember_options {
        if options.len() != 1 && options.len() != count {
            return Err(MemberError::InvalidOptionsArrayLength {
                resource: request.name.clone(),
                options: options.len(),
                members: count,
            });
        }
    }

    let records = (0..count)
        .map(|index| BalancerMemberRecord {
            server_name: request.server_name.at(index).clone(),
            balancer_ip: request.balancer_ip.at(index).clone(),
            balancer_port: request.balancer_port,
            options: request.balancermember_options.at(index).clone(),
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BalancerMemberRequest {
        BalancerMemberRequest::new("master00", "puppet00", 8140).with_options(OneOrMany::one("check"))
    }

    fn record(server_name: &str, balancer_ip: &str, options: &str) -> BalancerMemberRecord {
        BalancerMemberRecord {
            server_name: server_name.into(),
            balancer_ip: balancer_ip.into(),
            balancer_port: 8140,
            options: options.into(),
        }
    }

    #[test]
    fn scalars_expand_to_one_record() {
        let request = request()
            .with_server_name(OneOrMany::one("server01"))
            .with_balancer_ip(OneOrMany::one("192.168.56.200"));

        assert_eq!(
            expand(&request).unwrap(),
            vec![record("server01", "192.168.56.200", "check")]
        );
    }

    #[test]
    fn lists_pair_by_position() {
        let request = request()
            .with_server_name(OneOrMany::many(["a", "b", "c"]))
            .with_balancer_ip(OneOrMany::many(["x", "y", "z"]));

        assert_eq!(
            expand(&request).unwrap(),
            vec![
                record("a", "x", "check"),
                record("b", "y", "check"),
                record("c", "z", "check"),
            ]
        );
    }

    #[test]
    fn mismatched_lists_fail() {
        let request = request()
            .with_server_name(OneOrMany::many(["a", "b", "c"]))
            .with_balancer_ip(OneOrMany::many(["x", "y"]));

        assert_eq!(
            expand(&request),
            Err(MemberError::MismatchedArrayLength {
                resource: "master00".into(),
                server_names: 3,
                balancer_ips: 2,
            })
        );
    }

    #[test]
    fn scalar_is_repeated_against_list() {
        let request = request()
            .with_server_name(OneOrMany::one("shared"))
            .with_balancer_ip(OneOrMany::many(["10.0.0.1", "10.0.0.2"]));

        assert_eq!(
            expand(&request).unwrap(),
            vec![
                record("shared", "10.0.0.1", "check"),
                record("shared", "10.0.0.2", "check"),
            ]
        );
    }

    #[test]
    fn options_per_record() {
        let request = request()
            .with_server_name(OneOrMany::many(["a", "b"]))
            .with_balancer_ip(OneOrMany::many(["x", "y"]))
            .with_options(OneOrMany::many(["check", "backup"]));

        assert_eq!(
            expand(&request).unwrap(),
            vec![record("a", "x", "check"), record("b", "y", "backup")]
        );
    }

    #[test]
    fn single_element_options_list_is_shared() {
        let request = request()
            .with_server_name(OneOrMany::many(["a", "b"]))
            .with_balancer_ip(OneOrMany::many(["x", "y"]))
            .with_options(OneOrMany::many(["check"]));

        let records = expand(&request).unwrap();
        assert!(records.iter().all(|record| record.options == "check"));
    }

    #[test]
    fn options_list_of_wrong_length_fails() {
        let request = request()
            .with_server_name(OneOrMany::many(["a", "b", "c"]))
            .with_balancer_ip(OneOrMany::many(["x", "y", "z"]))
            .with_options(OneOrMany::many(["check", "backup"]));

        assert_eq!(
            expand(&request),
            Err(MemberError::InvalidOptionsArrayLength {
                resource: "master00".into(),
                options: 2,
                members: 3,
            })
        );
    }

    #[test]
    fn empty_lists_expand_to_nothing() {
        let request = request()
            .with_server_name(OneOrMany::many(Vec::<String>::new()))
            .with_balancer_ip(OneOrMany::one("10.0.0.1"));

        assert!(expand(&request).unwrap().is_empty());
    }
}
