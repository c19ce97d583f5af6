use serde::{Deserialize, Serialize};

/// Role carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Moderator,
    /// Any other authenticated account (storefront customers).
    Customer,
}

impl Role {
    /// Map the free-form role claim onto a known role; unknown values are customers.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "moderator" => Role::Moderator,
            _ => Role::Customer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Moderator => "moderator",
            Role::Customer => "customer",
        }
    }
}

/// Claims expected in tokens minted by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: String,
    /// Branch a moderator is assigned to.
    #[serde(default)]
    pub branch: Option<String>,
    pub exp: i64,
}

/// Caller identity established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub branch: Option<String>,
    pub exp: i64,
}

impl From<Claims> for AuthenticatedUser {
    fn from(value: Claims) -> Self {
        let branch = value
            .branch
            .map(|branch| branch.trim().to_ascii_lowercase())
            .filter(|branch| !branch.is_empty());

        Self {
            sub: value.sub,
            email: value.email,
            name: value.name,
            role: Role::parse(&value.role),
            branch,
            exp: value.exp,
        }
    }
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and managers may create and edit catalog entries.
    pub fn can_manage_catalog(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Back-office accounts: everyone except storefront customers.
    pub fn is_staff(&self) -> bool {
        self.role != Role::Customer
    }
}
