use std::process::Command;

fn main() {
    // Only rebuild CSS when template or CSS files change
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=assets/js/");
    println!("cargo:rerun-if-changed=templates/");
    println!("cargo:rerun-if-changed=tailwind.config.js");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-c",
            "tailwind.config.js",
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available, write a minimal hand-made stylesheet
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", FALLBACK_CSS).ok();
        }
    }
}

const FALLBACK_CSS: &str = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; -webkit-font-smoothing: antialiased; }
a { color: inherit; }
img { display: block; max-width: 100%; }
.min-h-screen { min-height: 100vh; }
.mx-auto { margin-left: auto; margin-right: auto; }
.max-w-4xl { max-width: 56rem; }
.max-w-xl { max-width: 36rem; }
.max-w-md { max-width: 28rem; }
.px-4 { padding-left: 1rem; padding-right: 1rem; }
.py-3 { padding-top: 0.75rem; padding-bottom: 0.75rem; }
.py-8 { padding-top: 2rem; padding-bottom: 2rem; }
.py-16 { padding-top: 4rem; padding-bottom: 4rem; }
.p-6 { padding: 1.5rem; }
.mb-4 { margin-bottom: 1rem; }
.mb-8 { margin-bottom: 2rem; }
.mt-16 { margin-top: 4rem; }
.flex { display: flex; }
.items-center { align-items: center; }
.justify-center { justify-content: center; }
.justify-between { justify-content: space-between; }
.gap-3 { gap: 0.75rem; }
.text-center { text-align: center; }
.text-xs { font-size: 0.75rem; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.text-4xl { font-size: 2.25rem; }
.font-semibold { font-weight: 600; }
.font-bold { font-weight: 700; }
.text-stone-500 { color: #78716c; }
.text-stone-600 { color: #57534e; }
.text-stone-900 { color: #1c1917; }
.bg-white { background-color: #fff; }
.bg-stone-50 { background-color: #fafaf9; }
.border { border: 1px solid #e7e5e4; }
.border-b { border-bottom: 1px solid #e7e5e4; }
.border-t { border-top: 1px solid #e7e5e4; }
.rounded-lg { border-radius: 0.5rem; }
.rounded-xl { border-radius: 0.75rem; }
.btn { display: inline-flex; align-items: center; padding: 0.5rem 1rem; border-radius: 0.5rem; border: none; background: #1c1917; color: #fff; font-size: 0.875rem; font-weight: 500; cursor: pointer; text-decoration: none; }
.btn-quiet { background: #e7e5e4; color: #44403c; }
.field { display: flex; flex-direction: column; gap: 0.25rem; margin-bottom: 1rem; font-size: 0.875rem; }
.field input, .field textarea { border: 1px solid #d6d3d1; border-radius: 0.5rem; padding: 0.5rem 0.75rem; font: inherit; }
.notice { border-radius: 0.5rem; padding: 0.75rem 1rem; font-size: 0.875rem; }
.notice-success { background: #f0fdf4; color: #166534; }
.notice-error { background: #fef2f2; color: #991b1b; }
.portfolio-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; }
.portfolio-tile img { width: 100%; aspect-ratio: 4 / 3; object-fit: cover; border-radius: 0.5rem; }
.page-link { padding: 0.25rem 0.75rem; border-radius: 0.5rem; font-size: 0.875rem; color: #57534e; text-decoration: none; }
.page-link.current { background: #1c1917; color: #fff; }
.sortable { display: flex; flex-direction: column; gap: 0.5rem; list-style: none; }
.sortable-item { display: flex; align-items: center; gap: 0.75rem; padding: 0.5rem; background: #fff; border: 1px solid #e7e5e4; border-radius: 0.5rem; touch-action: none; user-select: none; }
.sortable-item img { width: 6rem; height: 4rem; object-fit: cover; border-radius: 0.25rem; }
.sortable-item .actions { margin-left: auto; display: flex; gap: 0.25rem; }
.sortable-item.dragging { opacity: 0.5; }
.sortable-item.drop-target { border-color: #1c1917; }
.contacts { width: 100%; text-align: left; font-size: 0.875rem; border-collapse: collapse; }
.contacts td, .contacts th { border-bottom: 1px solid #e7e5e4; padding: 0.5rem; vertical-align: top; }
"#;
