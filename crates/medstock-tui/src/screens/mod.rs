//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod records;

use medstock_core::{Resource, SessionUser};

use crate::component::Component;
use crate::screen::ScreenId;

/// Dashboard plus one table screen per visible resource.
pub fn create_screens(
    visible: &[Resource],
    session: Option<SessionUser>,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    let mut screens: Vec<(ScreenId, Box<dyn Component>)> = vec![(
        ScreenId::Dashboard,
        Box::new(dashboard::DashboardScreen::new(visible, session)),
    )];
    for &resource in visible {
        screens.push((
            ScreenId::Records(resource),
            Box::new(records::RecordsScreen::new(resource)),
        ));
    }
    screens
}
