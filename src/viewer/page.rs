//! HTML page hosted by each surface

use std::collections::HashMap;

use rand::Rng;
use rand::distributions::Alphanumeric;

const NONCE_LEN: usize = 32;

/// URLs and tokens substituted into the surface page
#[derive(Clone, Debug)]
pub struct PageAssets {
    pub csp_source: String,
    pub renderer_script: String,
    pub worker_script: String,
    pub nonce: String,
}

/// Fresh script nonce for one surface
#[must_use]
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Replace `{{name}}` placeholders; unknown placeholders are left as-is
fn render_template(template: &str, variables: &HashMap<&str, &str>) -> String {
    let mut result = template.to_string();
    for (key, value) in variables {
        let placeholder = format!("{{{{{key}}}}}");
        result = result.replace(&placeholder, value);
    }
    result
}

#[must_use]
pub fn render_page(assets: &PageAssets) -> String {
    let variables = HashMap::from([
        ("csp_source", assets.csp_source.as_str()),
        ("renderer_script", assets.renderer_script.as_str()),
        ("worker_script", assets.worker_script.as_str()),
        ("nonce", assets.nonce.as_str()),
    ]);
    render_template(PAGE_TEMPLATE, &variables)
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="Content-Security-Policy" content="default-src 'none'; style-src {{csp_source}} 'unsafe-inline'; script-src {{csp_source}} 'nonce-{{nonce}}' 'unsafe-eval'; img-src {{csp_source}} data: blob:; connect-src {{csp_source}} https:; worker-src {{csp_source}} blob:;">
    <title>PDF Preview</title>
    <style>
        body { margin: 0; padding: 0; overflow: hidden; background-color: var(--vscode-editor-background); }
        #toolbar { position: absolute; top: 0; left: 0; right: 0; height: 40px; display: flex; align-items: center; padding: 0 10px; gap: 10px; border-bottom: 1px solid var(--vscode-widget-border); }
        #pdfContainer { position: absolute; top: 40px; left: 0; right: 0; bottom: 0; overflow: auto; text-align: center; background-color: #525659; }
        #pdfContainer.dark-mode { background-color: #1e1e1e; }
        .dark-mode .page canvas { filter: invert(0.9) hue-rotate(180deg); }
        .page { margin: 10px auto; box-shadow: 0 0 10px rgba(0, 0, 0, 0.5); position: relative; }
        .sync-indicator { position: absolute; width: 50px; height: 20px; background-color: rgba(255, 255, 0, 0.4); border: 2px solid #ffff00; pointer-events: none; animation: fade-out 2s ease-in-out forwards; }
        @keyframes fade-out { 0% { opacity: 1; } 50% { opacity: 1; } 100% { opacity: 0; } }
        #pageInfo { margin-left: auto; color: var(--vscode-editor-foreground); }
    </style>
</head>
<body>
    <div id="toolbar">
        <button id="zoomOut" title="Zoom Out">-</button>
        <button id="zoomIn" title="Zoom In">+</button>
        <button id="fitPage" title="Fit Page">Fit Page</button>
        <button id="fitWidth" title="Fit Width">Fit Width</button>
        <button id="darkMode" title="Toggle Dark Mode">Dark</button>
        <span id="pageInfo">Page: <span id="currentPage">0</span> / <span id="totalPages">0</span></span>
    </div>
    <div id="pdfContainer"></div>
    <script src="{{renderer_script}}" nonce="{{nonce}}"></script>
    <script nonce="{{nonce}}">
        const host = acquireVsCodeApi();
        const state = host.getState() || {};
        let pdfDoc = null;
        let documentUrl = null;
        let scale = 1.5;
        let darkMode = state.darkMode !== undefined ? state.darkMode : true;

        pdfjsLib.GlobalWorkerOptions.workerSrc = '{{worker_script}}';

        function applyDarkMode() {
            document.getElementById('pdfContainer').classList.toggle('dark-mode', darkMode);
            host.setState({ ...host.getState(), darkMode });
        }
        applyDarkMode();

        window.addEventListener('message', event => {
            const message = event.data;
            if (message.command === 'loadDocument') {
                documentUrl = message.documentUrl;
                loadDocument(documentUrl);
            } else if (message.command === 'scrollToPosition') {
                scrollToPosition(message.page, message.x, message.y);
            }
        });

        async function loadDocument(url) {
            try {
                pdfDoc = await pdfjsLib.getDocument(url).promise;
                document.getElementById('totalPages').textContent = pdfDoc.numPages;
                document.getElementById('pdfContainer').innerHTML = '';
                for (let i = 1; i <= pdfDoc.numPages; i++) { await renderPage(i); }
                host.postMessage({ command: 'ready' });
            } catch (e) {
                host.postMessage({ command: 'error', text: e.message });
            }
        }

        async function renderPage(num) {
            const page = await pdfDoc.getPage(num);
            const viewport = page.getViewport({ scale });
            const container = document.createElement('div');
            container.className = 'page';
            container.id = 'page-' + num;
            const canvas = document.createElement('canvas');
            canvas.width = viewport.width;
            canvas.height = viewport.height;
            container.appendChild(canvas);
            document.getElementById('pdfContainer').appendChild(container);
            await page.render({ canvasContext: canvas.getContext('2d'), viewport }).promise;

            canvas.addEventListener('click', e => {
                if ((e.metaKey || e.ctrlKey) && e.shiftKey) {
                    const rect = canvas.getBoundingClientRect();
                    host.postMessage({
                        command: 'syncPdfToTex',
                        page: num,
                        x: (e.clientX - rect.left) * (canvas.width / rect.width) / scale,
                        y: (e.clientY - rect.top) * (canvas.height / rect.height) / scale
                    });
                }
            });
        }

        function scrollToPosition(page, x, y) {
            const el = document.getElementById('page-' + page);
            if (el) {
                el.scrollIntoView({ behavior: 'smooth', block: 'center' });
                const marker = document.createElement('div');
                marker.className = 'sync-indicator';
                marker.style.left = (x * scale) + 'px';
                marker.style.top = (y * scale) + 'px';
                el.appendChild(marker);
                setTimeout(() => marker.remove(), 2000);
            }
            document.getElementById('currentPage').textContent = page;
        }

        async function changeScale(newScale) {
            if (!pdfDoc || !documentUrl) return;
            scale = newScale;
            await loadDocument(documentUrl);
        }

        async function fitTo(dimension) {
            if (!pdfDoc) return;
            const container = document.getElementById('pdfContainer');
            const page = await pdfDoc.getPage(1);
            const viewport = page.getViewport({ scale: 1 });
            if (dimension === 'height') {
                changeScale((container.clientHeight - 20) / viewport.height);
            } else {
                changeScale((container.clientWidth - 20) / viewport.width);
            }
        }

        document.getElementById('zoomIn').onclick = () => changeScale(scale * 1.2);
        document.getElementById('zoomOut').onclick = () => changeScale(scale / 1.2);
        document.getElementById('fitPage').onclick = () => fitTo('height');
        document.getElementById('fitWidth').onclick = () => fitTo('width');
        document.getElementById('darkMode').onclick = () => { darkMode = !darkMode; applyDarkMode(); };
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> PageAssets {
        PageAssets {
            csp_source: "surface-resource:".to_string(),
            renderer_script: "surface-resource://ext/pdf.js".to_string(),
            worker_script: "surface-resource://ext/pdf.worker.js".to_string(),
            nonce: "abc123".to_string(),
        }
    }

    #[test]
    fn nonce_is_32_alphanumeric_chars() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn nonces_differ_between_calls() {
        assert_ne!(generate_nonce(), generate_nonce());
    }

    #[test]
    fn page_substitutes_every_placeholder() {
        let html = render_page(&assets());
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<script src="surface-resource://ext/pdf.js" nonce="abc123">"#));
        assert!(html.contains("workerSrc = 'surface-resource://ext/pdf.worker.js'"));
        assert!(html.contains("script-src surface-resource: 'nonce-abc123'"));
    }

    #[test]
    fn page_speaks_the_message_protocol() {
        let html = render_page(&assets());
        for command in ["loadDocument", "scrollToPosition", "syncPdfToTex", "ready", "error"] {
            assert!(html.contains(command), "missing {command}");
        }
    }

    #[test]
    fn template_leaves_unknown_placeholders() {
        let vars = HashMap::from([("known", "yes")]);
        assert_eq!(
            render_template("{{known}} {{unknown}}", &vars),
            "yes {{unknown}}"
        );
    }
}
