use serde::{Deserialize, Serialize};

use crate::error::{invalid_state_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Menu,
    Media,
    Map,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    OpenCamera,
    OpenMap,
    Back,
}

impl Default for Screen {
    fn default() -> Self {
        Screen::Menu
    }
}

impl Screen {
    pub fn navigate(self, navigation: Navigation) -> Result<Screen, Error> {
        match (self, navigation) {
            (Screen::Menu, Navigation::OpenCamera) => Ok(Screen::Media),
            (Screen::Menu, Navigation::OpenMap) => Ok(Screen::Map),
            (Screen::Media, Navigation::Back) | (Screen::Map, Navigation::Back) => Ok(Screen::Menu),
            _ => Err(invalid_state_error()),
        }
    }
}

#[test]
fn menu_opens_both_screens() {
    assert_eq!(Screen::Menu.navigate(Navigation::OpenCamera).unwrap(), Screen::Media);
    assert_eq!(Screen::Menu.navigate(Navigation::OpenMap).unwrap(), Screen::Map);
}

#[test]
fn back_returns_to_menu() {
    assert_eq!(Screen::Media.navigate(Navigation::Back).unwrap(), Screen::Menu);
    assert_eq!(Screen::Map.navigate(Navigation::Back).unwrap(), Screen::Menu);
}

#[test]
fn rejects_transitions_the_screen_does_not_offer() {
    assert_eq!(Screen::Menu.navigate(Navigation::Back).unwrap_err().code, 100);
    assert_eq!(Screen::Map.navigate(Navigation::OpenCamera).unwrap_err().code, 100);
    assert_eq!(Screen::Media.navigate(Navigation::OpenMap).unwrap_err().code, 100);
}
