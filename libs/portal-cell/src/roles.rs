//! Role-based routing for the staff dashboard.

use branch_cell::models::ColorTheme;
use shared_models::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
}

const fn nav(id: &'static str, label: &'static str) -> NavItem {
    NavItem { id, label }
}

static ADMIN_NAV: [NavItem; 6] = [
    nav("dashboard", "Overview"),
    nav("doctors", "Doctor Mgmt"),
    nav("branches", "Branch Mgmt"),
    nav("patients", "Patients"),
    nav("employees", "Employees"),
    nav("reports", "Reports"),
];

static EMPLOYEE_NAV: [NavItem; 3] = [
    nav("dashboard", "Front Desk"),
    nav("bookings", "Bookings"),
    nav("patient-search", "Patient Search"),
];

static DOCTOR_NAV: [NavItem; 2] = [nav("dashboard", "My Dashboard"), nav("prescriptions", "Prescriptions")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    AdminOverview,
    DoctorManagement,
    BranchManagement,
    FrontDesk,
    DoctorDesk,
    /// Navigation entry with no implementation yet.
    Placeholder { page: String },
    UnknownRole(String),
}

impl DashboardView {
    pub fn title(&self) -> String {
        match self {
            DashboardView::AdminOverview => "Overview".to_string(),
            DashboardView::DoctorManagement => "Doctor Mgmt".to_string(),
            DashboardView::BranchManagement => "Branch Mgmt".to_string(),
            DashboardView::FrontDesk => "Front Desk".to_string(),
            DashboardView::DoctorDesk => "My Dashboard".to_string(),
            DashboardView::Placeholder { page } => format!("Feature {} coming soon in full version.", page),
            DashboardView::UnknownRole(_) => "Unknown Role".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub role: Option<Role>,
    pub nav: &'static [NavItem],
    pub default_view: DashboardView,
}

impl RouteTable {
    pub fn permits(&self, page_id: &str) -> bool {
        self.nav.iter().any(|item| item.id == page_id)
    }
}

pub fn nav_for(role: Role) -> &'static [NavItem] {
    match role {
        Role::Admin => &ADMIN_NAV,
        Role::Employee => &EMPLOYEE_NAV,
        Role::Doctor => &DOCTOR_NAV,
    }
}

/// Routing table for a role tag as carried by the session.
pub fn route(role_tag: &str) -> RouteTable {
    match Role::parse(role_tag) {
        Some(role) => RouteTable {
            role: Some(role),
            nav: nav_for(role),
            default_view: resolve_page(role, "dashboard"),
        },
        None => RouteTable {
            role: None,
            nav: &[],
            default_view: DashboardView::UnknownRole(role_tag.to_string()),
        },
    }
}

/// View for a navigation page. Employees and doctors have a single desk
/// that serves every page in their navigation.
pub fn resolve_page(role: Role, page_id: &str) -> DashboardView {
    match role {
        Role::Admin => match page_id {
            "dashboard" => DashboardView::AdminOverview,
            "doctors" => DashboardView::DoctorManagement,
            "branches" => DashboardView::BranchManagement,
            other => DashboardView::Placeholder { page: other.to_string() },
        },
        Role::Employee => DashboardView::FrontDesk,
        Role::Doctor => DashboardView::DoctorDesk,
    }
}

/// Class names for a branch theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePalette {
    pub bg: String,
    pub light: String,
    pub text: String,
    pub border: String,
}

impl From<ColorTheme> for ThemePalette {
    fn from(theme: ColorTheme) -> Self {
        let c = theme.as_str();
        Self {
            bg: format!("bg-{}-600", c),
            light: format!("bg-{}-50", c),
            text: format!("text-{}-600", c),
            border: format!("border-{}-200", c),
        }
    }
}

/// Palette of the active branch, blue when none is active.
pub fn palette(theme: Option<ColorTheme>) -> ThemePalette {
    theme.unwrap_or_default().into()
}
