use stepchase_core::AppState;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let rows: Vec<serde_json::Value> = AppState::ALL
            .iter()
            .map(|state| {
                serde_json::json!({
                    "state": state,
                    "next_action": state.next_action_label(),
                    "terminal": state.is_terminal(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for state in AppState::ALL {
        println!("{:<12} -> {}", state.to_string(), state.next_action_label());
    }
    Ok(())
}
