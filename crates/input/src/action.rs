/// A one-shot command triggered by a key press.
///
/// The game consumes actions, never raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Leave the application. Moves the app state to `Quit`.
    Quit,
    ToggleWireframe,
    /// Toggle whether mouse motion steers the camera.
    ToggleMouseFollow,
    ToggleBloom,
    ToggleSsao,
    /// Ask the render backend to rebuild its shader programs.
    ReloadShaders,
    /// Show or hide the debug helper geometry.
    ToggleHelpers,
    /// Write the current camera to disk.
    SaveCamera,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Quit,
        Action::ToggleWireframe,
        Action::ToggleMouseFollow,
        Action::ToggleBloom,
        Action::ToggleSsao,
        Action::ReloadShaders,
        Action::ToggleHelpers,
        Action::SaveCamera,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::ToggleWireframe => "toggle wireframe",
            Action::ToggleMouseFollow => "toggle mouse follow",
            Action::ToggleBloom => "toggle bloom",
            Action::ToggleSsao => "toggle SSAO",
            Action::ReloadShaders => "reload shaders",
            Action::ToggleHelpers => "toggle helpers",
            Action::SaveCamera => "save camera",
        }
    }
}

/// A continuous control that is active while its key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    Sprint,
    LookUp,
    LookDown,
    LookLeft,
    LookRight,
}
