use super::action::Action;
use super::effects::Effect;
use super::reducers::{reduce_data_loading, reduce_scroll, reduce_timeline};
use super::state::ScreenState;

/// Pure state reducer - like Redux reducer
///
/// Takes current state and an action, returns new state and an effect.
/// No I/O happens here; everything that touches the provider or the
/// preferences store is returned as an `Effect` for the runtime to run.
///
/// Ownership is passed through the sub-reducer chain to avoid cloning:
/// - Each sub-reducer returns Ok((state, effect)) if it handled the action
/// - Or Err(state) to pass ownership back for the next reducer to try
pub fn reduce(state: ScreenState, action: Action) -> (ScreenState, Effect) {
    // Session and data loading actions
    let state = match reduce_data_loading(state, &action) {
        Ok(result) => return result,
        Err(state) => state,
    };

    // Period expansion actions
    let state = match reduce_timeline(state, &action) {
        Ok(result) => return result,
        Err(state) => state,
    };

    // Geometry, navigation and resume actions
    let state = match reduce_scroll(state, &action) {
        Ok(result) => return result,
        Err(state) => state,
    };

    match action {
        Action::SetStatusMessage { message, is_error } => {
            let mut new_state = state;
            if is_error {
                new_state.system.set_status_error_message(message);
            } else {
                new_state.system.set_status_message(message);
            }
            (new_state, Effect::None)
        }

        _ => (state, Effect::None),
    }
}
