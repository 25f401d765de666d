//! GraphQL documents issued against the data API.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

pub const AUDIT_TRAIL: Operation = Operation {
    name: "AuditTrail",
    document: r#"query AuditTrail {
  audit_trail {
    timestamp
    description
    event_type
    category
    performed_by
  }
}"#,
};

pub const TENANT_USAGE: Operation = Operation {
    name: "GetTenantUsage",
    document: r#"query GetTenantUsage {
  data_usage {
    id
    tenant_id
    data_used
  }
}"#,
};

pub const DAILY_USAGE: Operation = Operation {
    name: "GetDailyDataUsage",
    document: r#"query GetDailyDataUsage {
  daily_data_usage(order_by: {recorded_on: asc}) {
    recorded_on
    total_data_used
  }
}"#,
};

/// Login lookup; `name`/`passwd` are aliased to the field names the console uses.
pub const USERS_BY_EMAIL: Operation = Operation {
    name: "Users",
    document: r#"query Users($_eq: String = "") {
  Users: users(where: {email: {_eq: $_eq}}) {
    id
    username: name
    email
    password: passwd
  }
}"#,
};

pub const INSERT_USERS: Operation = Operation {
    name: "InsertUsers",
    document: r#"mutation InsertUsers($username: String!, $email: String!, $password: String!) {
  insert_Users: insert_users(objects: {name: $username, email: $email, passwd: $password}) {
    returning {
      id
      username: name
      email
    }
  }
}"#,
};

pub const HEALTH: Operation = Operation {
    name: "Health",
    document: "query Health { __typename }",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_declare_their_operation_name() {
        for op in [AUDIT_TRAIL, TENANT_USAGE, DAILY_USAGE, USERS_BY_EMAIL, INSERT_USERS, HEALTH] {
            let header = op
                .document
                .split(['(', '{'])
                .next()
                .expect("document header");
            assert!(
                header.trim().ends_with(op.name),
                "{} does not declare {}",
                op.document,
                op.name
            );
        }
    }

    #[test]
    fn login_lookup_aliases_password_column() {
        assert!(USERS_BY_EMAIL.document.contains("password: passwd"));
        assert!(USERS_BY_EMAIL.document.contains("Users: users"));
    }
}
