use runtime_data::{KnownFields, RuntimeData};

fn main() {
    env_logger::init();

    // On native platforms, this will use the config directory
    // On WASM, this will use localStorage
    let mut data = RuntimeData::for_app("com.example.myapp").expect("Failed to open runtime data");

    // Values set before init are kept, even if storage has a different one
    data.set("launchedFrom", "basic_usage").expect("Failed to set launchedFrom");

    data.init().expect("Failed to load runtime data");

    println!("Current runtime data:");
    for (key, value) in data.entries() {
        println!("  {}: {}", key, value);
    }

    let launches = data.get_as::<u64>("launchCount").unwrap_or(0);
    data.set("launchCount", launches + 1).expect("Failed to save launchCount");

    if data.skip_folder_rights_warning().is_none() {
        data.set_skip_folder_rights_warning(true)
            .expect("Failed to save skipFolderRightsWarning");
    }

    // Writing the same value again does not touch storage
    data.set("launchCount", launches + 1).expect("Failed to save launchCount");

    println!("\nRuntime data stored at: {}", data.storage_location());
    println!("{}", data.to_json_string().expect("Failed to encode runtime data"));
}
