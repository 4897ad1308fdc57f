use std::str::FromStr;

use fleetdesk_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Dashboard actions and pages gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows reaching the dashboard home.
    ViewDashboard,
    /// Allows listing jobs.
    ViewJobs,
    /// Allows creating and dispatching jobs.
    CreateJob,
    /// Allows reading the driver roster.
    ViewDrivers,
    /// Allows adding, editing and removing drivers.
    ManageDrivers,
    /// Allows reading the vehicle roster.
    ViewFleet,
    /// Allows reading inspection reports.
    ViewInspections,
    /// Allows filing an inspection report.
    SubmitInspection,
    /// Allows QuickBooks invoicing.
    ManageInvoices,
    /// Allows changing company settings.
    ManageSettings,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewDashboard => "dashboard.view",
            Self::ViewJobs => "jobs.view",
            Self::CreateJob => "jobs.create",
            Self::ViewDrivers => "drivers.view",
            Self::ManageDrivers => "drivers.manage",
            Self::ViewFleet => "fleet.view",
            Self::ViewInspections => "inspections.view",
            Self::SubmitInspection => "inspections.submit",
            Self::ManageInvoices => "quickbooks.manage",
            Self::ManageSettings => "settings.manage",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::ViewDashboard,
            Capability::ViewJobs,
            Capability::CreateJob,
            Capability::ViewDrivers,
            Capability::ManageDrivers,
            Capability::ViewFleet,
            Capability::ViewInspections,
            Capability::SubmitInspection,
            Capability::ManageInvoices,
            Capability::ManageSettings,
        ];

        ALL
    }

    /// Roles the static table grants this capability to.
    #[must_use]
    pub fn granted_roles(&self) -> Vec<Role> {
        Role::all()
            .iter()
            .copied()
            .filter(|role| capabilities_for(*role).contains(self))
            .collect()
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}

/// Static role to capability table.
#[must_use]
pub fn capabilities_for(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => Capability::all(),
        Role::Dispatcher => &[
            Capability::ViewDashboard,
            Capability::ViewJobs,
            Capability::CreateJob,
            Capability::ViewDrivers,
            Capability::ViewFleet,
            Capability::ViewInspections,
        ],
        Role::Driver => &[
            Capability::ViewDashboard,
            Capability::ViewJobs,
            Capability::ViewInspections,
            Capability::SubmitInspection,
        ],
    }
}

/// Path of the dashboard home, the redirect target for wrong-role access.
pub const DASHBOARD_HOME_PATH: &str = "/dashboard";

/// Path of the login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Protected dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPage {
    /// Dashboard landing page.
    Home,
    /// Job board.
    Jobs,
    /// Driver roster.
    Drivers,
    /// Vehicle roster.
    Fleet,
    /// Inspection reports.
    Inspections,
    /// QuickBooks invoicing.
    QuickBooks,
    /// Company settings.
    Settings,
}

impl DashboardPage {
    /// Returns the canonical route for the page.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => DASHBOARD_HOME_PATH,
            Self::Jobs => "/dashboard/jobs",
            Self::Drivers => "/dashboard/drivers",
            Self::Fleet => "/dashboard/fleet",
            Self::Inspections => "/dashboard/inspections",
            Self::QuickBooks => "/dashboard/quickbooks",
            Self::Settings => "/dashboard/settings",
        }
    }

    /// Returns the capability needed to view the page.
    #[must_use]
    pub fn required_capability(&self) -> Capability {
        match self {
            Self::Home => Capability::ViewDashboard,
            Self::Jobs => Capability::ViewJobs,
            Self::Drivers => Capability::ViewDrivers,
            Self::Fleet => Capability::ViewFleet,
            Self::Inspections => Capability::ViewInspections,
            Self::QuickBooks => Capability::ManageInvoices,
            Self::Settings => Capability::ManageSettings,
        }
    }

    /// Returns all pages.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[DashboardPage] = &[
            DashboardPage::Home,
            DashboardPage::Jobs,
            DashboardPage::Drivers,
            DashboardPage::Fleet,
            DashboardPage::Inspections,
            DashboardPage::QuickBooks,
            DashboardPage::Settings,
        ];

        ALL
    }

    /// Resolves a requested path to its page.
    ///
    /// Query string, fragment and trailing slashes are ignored; nested
    /// routes such as `/dashboard/jobs/42` resolve to their section.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        if path == DASHBOARD_HOME_PATH {
            return Some(Self::Home);
        }

        let section = path
            .strip_prefix("/dashboard/")?
            .split('/')
            .next()
            .unwrap_or_default();

        Self::all()
            .iter()
            .copied()
            .filter(|page| *page != Self::Home)
            .find(|page| page.path().rsplit('/').next() == Some(section))
    }
}
