//! Grant form handling.
//!
//! Validation is a pure pass over the raw field text; the normalized values
//! come back to the caller, which decides whether to write them into the
//! fields. Nothing here touches the UI.

use relaypanel_grants::{normalize, validate, Grant, PortRange, ValidationError};

/// Raw text of the new-user / edit form, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantForm {
    pub user: String,
    pub token: String,
    pub comment: String,
    pub server: String,
    pub ports: String,
    pub domains: String,
    pub subdomains: String,
    pub expire_date: String,
}

/// A form that passed validation, carrying the normalized text of every
/// field. These are the values to write back into the inputs; [`Self::to_grant`]
/// builds the wire record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedForm {
    pub user: String,
    pub token: String,
    pub comment: String,
    pub server: String,
    pub ports: String,
    pub domains: String,
    pub subdomains: String,
    pub expire_date: String,
}

impl GrantForm {
    /// Put an allocator proposal into the ports field. The range stays one
    /// literal `start-end` element all the way to the wire.
    pub fn apply_proposal(&mut self, range: &PortRange) {
        self.ports = range.to_string();
    }

    /// Validate every field, collecting all failures so the caller can flag
    /// each offending input at once.
    pub fn validate(&self) -> Result<NormalizedForm, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let user = check(validate::user(&self.user), ValidationError::User, &mut errors);
        let token = check(validate::token(&self.token), ValidationError::Token, &mut errors);
        let comment = check(
            validate::comment(&self.comment),
            ValidationError::Comment,
            &mut errors,
        );
        let server = check(
            validate::server(&self.server),
            ValidationError::Server,
            &mut errors,
        );
        let ports = check(validate::ports(&self.ports), ValidationError::Ports, &mut errors);
        let domains = check(
            validate::domains(&self.domains),
            ValidationError::Domains,
            &mut errors,
        );
        let subdomains = check(
            validate::subdomains(&self.subdomains),
            ValidationError::Subdomains,
            &mut errors,
        );
        let expire_date = check(
            validate::expire_date(&self.expire_date),
            ValidationError::ExpireDate,
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NormalizedForm {
            user,
            token,
            comment,
            server,
            ports,
            domains,
            subdomains,
            expire_date,
        })
    }
}

fn check(
    result: validate::FieldCheck,
    error: ValidationError,
    errors: &mut Vec<ValidationError>,
) -> String {
    if !result.valid {
        errors.push(error);
    }
    result.normalized
}

impl NormalizedForm {
    /// Build the wire grant. The backend stamps `create_date` and activates
    /// the record on create.
    pub fn to_grant(&self) -> Grant {
        Grant {
            user: self.user.clone(),
            token: self.token.clone(),
            comment: self.comment.clone(),
            server: self.server.clone(),
            ports: normalize::split_ports(&self.ports),
            domains: normalize::split_list(&self.domains),
            subdomains: normalize::split_list(&self.subdomains),
            create_date: String::new(),
            expire_date: self.expire_date.clone(),
            enable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaypanel_grants::PortValue;

    fn filled_form() -> GrantForm {
        GrantForm {
            user: "alice".to_string(),
            token: "s3cret!".to_string(),
            comment: "staging box".to_string(),
            server: "eu-1".to_string(),
            ports: " 8080 , 9000 - 9010 ".to_string(),
            domains: "api.example.com".to_string(),
            subdomains: "alice".to_string(),
            expire_date: "".to_string(),
        }
    }

    #[test]
    fn valid_form_normalizes_and_converts() {
        let normalized = filled_form().validate().unwrap();
        assert_eq!(normalized.ports, "8080,9000-9010");

        let grant = normalized.to_grant();
        assert_eq!(
            grant.ports,
            vec![PortValue::Num(8080), PortValue::Text("9000-9010".to_string())]
        );
        assert_eq!(grant.domains, vec!["api.example.com".to_string()]);
        assert!(grant.create_date.is_empty());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut form = filled_form();
        form.user = "bad user".to_string();
        form.ports = "2000-1000".to_string();
        form.server = String::new();

        let errors = form.validate().unwrap_err();
        assert!(errors.contains(&ValidationError::User));
        assert!(errors.contains(&ValidationError::Ports));
        assert!(errors.contains(&ValidationError::Server));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn proposal_becomes_a_single_range_element() {
        let mut form = filled_form();
        form.apply_proposal(&PortRange { start: 10001, end: 10006 });
        assert_eq!(form.ports, "10001-10006");

        let grant = form.validate().unwrap().to_grant();
        assert_eq!(grant.ports, vec![PortValue::Text("10001-10006".to_string())]);
    }

    #[test]
    fn empty_optional_fields_are_fine() {
        let form = GrantForm {
            user: "alice".to_string(),
            token: "tok".to_string(),
            server: "eu-1".to_string(),
            ..GrantForm::default()
        };
        let grant = form.validate().unwrap().to_grant();
        assert!(grant.ports.is_empty());
        assert!(grant.domains.is_empty());
        assert!(grant.subdomains.is_empty());
    }
}
