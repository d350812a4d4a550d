//! `fluxlura formats`.

use fluxlura_core::catalogue;
use fluxlura_core::MediaKind;

pub fn print_formats(kind: Option<MediaKind>, show_args: bool) {
    let kinds: Vec<MediaKind> = match kind {
        Some(kind) => vec![kind],
        None => MediaKind::ALL.to_vec(),
    };

    for kind in kinds {
        if show_args {
            println!("{}:", kind);
            for format in catalogue::all().iter().filter(|f| f.kind == kind) {
                println!("  {:<6} {}", format.extension, format.args.join(" "));
            }
        } else {
            let extensions: Vec<&str> = catalogue::extensions(kind).collect();
            println!("{:<6} {}", format!("{}:", kind), extensions.join(" "));
        }
    }
}
