#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    PatternInput,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Mode transitions
    EnterPatternInput,
    ShowHistory,

    // Match navigation
    NextMatch,
    PreviousMatch,
    FirstMatch,
    LastMatch,
    /// 1-based match number as typed
    JumpToMatch(usize),

    // Session
    ClearHighlights,
    CopyResults,
    Reload,
    ToggleIgnoreCase,

    // Scrolling
    ScrollDown(usize),
    ScrollUp(usize),
    PageDown,
    PageUp,
    Redraw,

    Quit,
}
