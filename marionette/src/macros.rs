/// Creates a single conversation [`Turn`](crate::Turn) from a role
/// shorthand.
///
/// ```rust
/// use marionette::{Role, mar_turn};
///
/// let turn = mar_turn!(assistant => "Done.");
/// assert_eq!(turn.role, Role::Assistant);
/// assert_eq!(turn.content_str(), "Done.");
/// ```
#[macro_export]
macro_rules! mar_turn {
    (system => $content:expr $(,)?) => {
        $crate::Turn::system($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Turn::user($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Turn::assistant($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Turn>` from role/content pairs.
///
/// ```rust
/// use marionette::{Role, mar_turns};
///
/// let turns = mar_turns![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(turns.len(), 2);
/// assert_eq!(turns[0].role, Role::System);
/// assert_eq!(turns[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! mar_turns {
    () => {
        Vec::<$crate::Turn>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::mar_turn!($role => $content)),+]
    };
}
