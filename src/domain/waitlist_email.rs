use validator::ValidateEmail;

/// A well-formed email address destined for the waitlist.
///
/// The signup form relies on the browser's `type="email"` checking before
/// submission; this is the server-side counterpart. Parsing is done once at
/// the edge, so everything downstream can take validity for granted instead
/// of re-validating at every callsite.
#[derive(Debug)]
pub struct WaitlistEmail(String);

impl WaitlistEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        ValidateEmail::validate_email(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("Invalid email: {email:?}"))
    }
}

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str { &self.0 }
}
