fn main() {
    // Only rerun build.rs if something inside targets/ or `AVR_FUSES_TARGETS_DIR`
    // has changed. (By default cargo reruns build.rs if any file under the crate
    // root has changed) This improves build times and IDE responsivity when not
    // editing targets.
    println!("cargo:rerun-if-changed=targets");
    println!("cargo:rerun-if-env-changed=AVR_FUSES_TARGETS_DIR");

    // Handle builtin targets (generates targets.bincode)
    handle_builtin_targets();
}

#[cfg(not(feature = "builtin-targets"))]
fn handle_builtin_targets() {
    // Nothing to do here
}

#[cfg(feature = "builtin-targets")]
fn handle_builtin_targets() {
    builtin_targets::process();
}

#[cfg(feature = "builtin-targets")]
mod builtin_targets {

    use std::env;
    use std::fs::{read_dir, read_to_string};
    use std::io;
    use std::path::Path;

    use avr_fuses_target::McuFamily;

    pub fn process() {
        let mut families = Vec::new();
        let mut process_target_yaml = |file: &Path| {
            if file.extension().map_or(true, |extension| extension != "yaml") {
                return;
            }

            let string = read_to_string(file).unwrap_or_else(|error| {
                panic!(
                    "Failed to read MCU description {} because:\n{error}",
                    file.display()
                )
            });

            match serde_yaml::from_str::<McuFamily>(&string) {
                Ok(family) => {
                    if let Err(error) = family.validate() {
                        panic!(
                            "Invalid MCU description {} because:\n{error}",
                            file.display()
                        );
                    }
                    families.push(family);
                }
                Err(error) => panic!(
                    "Failed to parse MCU description: {} because:\n{error}",
                    file.display()
                ),
            }
        };

        visit_dirs("targets", &mut process_target_yaml).unwrap();

        // Check if there are any additional targets to generate for
        if let Ok(additional_target_dir) = env::var("AVR_FUSES_TARGETS_DIR") {
            println!("cargo:rerun-if-changed={additional_target_dir}");
            visit_dirs(additional_target_dir, &mut process_target_yaml).unwrap();
        }

        // Keep the embedded data independent of directory iteration order.
        families.sort_by(|a, b| a.name.cmp(&b.name));

        let families_bin =
            bincode::serialize(&families).expect("Failed to serialize families as bincode");

        let out_dir = env::var("OUT_DIR").unwrap();
        let dest_path = Path::new(&out_dir).join("targets.bincode");
        std::fs::write(dest_path, &families_bin).unwrap();

        // Check if we can deserialize the bincode again, otherwise the binary will not be usable.
        if let Err(deserialize_error) = bincode::deserialize::<Vec<McuFamily>>(&families_bin) {
            panic!(
                "Failed to deserialize supported MCU descriptions from bincode: {deserialize_error:?}"
            );
        }
    }

    /// Call `process` on all files in a directory and its subdirectories.
    fn visit_dirs(dir: impl AsRef<Path>, process: &mut impl FnMut(&Path)) -> io::Result<()> {
        // Inner function to avoid generating multiple implementations for the different path types.
        fn visit_dirs_impl(dir: &Path, process: &mut impl FnMut(&Path)) -> io::Result<()> {
            for entry in read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    visit_dirs_impl(&path, process)?;
                } else {
                    process(&path);
                }
            }

            Ok(())
        }

        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(());
        }

        visit_dirs_impl(dir, process)
    }
}
