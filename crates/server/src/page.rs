//! # Chat Page
//!
//! Renders the single HTML page served at `/`. Every page load starts a fresh
//! session and an empty transcript; the session is ended when the page is
//! hidden. Each question is echoed into the transcript before the request is
//! sent, and the answer (or the error) is appended when the server replies.

use catalog_chat::{constants::PENDING_MESSAGE, PageChrome};
use minijinja::{context, Environment};

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
<style>
  body { margin: 0; font-family: system-ui, sans-serif; display: flex; min-height: 100vh; }
  main { flex: 1; display: flex; flex-direction: column; padding: 1.5rem 2rem; }
  aside { width: 18rem; background: #f4f5f7; padding: 1.5rem; }
  #transcript { flex: 1; overflow-y: auto; }
  .turn { margin: 0.5rem 0; padding: 0.75rem 1rem; border-radius: 0.5rem; white-space: pre-wrap; }
  .turn.user { background: #e8f0fe; }
  .turn.assistant { background: #f1f3f4; white-space: normal; }
  .turn.assistant > :first-child { margin-top: 0; }
  .turn.assistant > :last-child { margin-bottom: 0; }
  .turn.pending { color: #666; font-style: italic; }
  .turn.error { background: #fdecea; color: #b3261e; }
  form { display: flex; gap: 0.5rem; margin-top: 1rem; }
  input { flex: 1; padding: 0.6rem; font-size: 1rem; }
  .caption { color: #666; margin-top: -0.5rem; }
</style>
</head>
<body>
<main>
  <h1>{{ heading }}</h1>
  <p class="caption">{{ caption }}</p>
  <div id="transcript"></div>
  <form id="ask">
    <input id="question" autocomplete="off" placeholder="{{ placeholder }}">
    <button type="submit">Send</button>
  </form>
</main>
<aside>
  <h2>Example Questions</h2>
  <ul>
{%- for question in examples %}
    <li>{{ question }}</li>
{%- endfor %}
  </ul>
  <hr>
  <h2>About</h2>
  <p>{{ about }}</p>
  <p>Powered by:</p>
  <ul>
{%- for item in powered_by %}
    <li>{{ item }}</li>
{%- endfor %}
  </ul>
</aside>
<script>
const PENDING_MESSAGE = {{ pending|tojson }};
const transcript = document.getElementById("transcript");
const form = document.getElementById("ask");
const input = document.getElementById("question");
let sessionId = null;

function show(role, content, html) {
  const div = document.createElement("div");
  div.className = "turn " + role;
  if (html) {
    div.innerHTML = html;
  } else {
    div.textContent = content;
  }
  transcript.appendChild(div);
  transcript.scrollTop = transcript.scrollHeight;
  return div;
}

async function startSession() {
  const res = await fetch("/sessions", { method: "POST" });
  const body = await res.json();
  sessionId = body.session_id;
}

function endSession() {
  if (sessionId) {
    fetch("/sessions/" + sessionId, { method: "DELETE", keepalive: true });
    sessionId = null;
  }
}

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const content = input.value;
  if (!content.trim()) return;
  input.value = "";
  input.disabled = true;
  show("user", content);
  const pending = show("pending", PENDING_MESSAGE);
  try {
    if (!sessionId) await startSession();
    const res = await fetch("/sessions/" + sessionId + "/messages", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ content }),
    });
    const body = await res.json();
    pending.remove();
    if (res.ok) {
      body.result.turns
        .filter(t => t.role === "assistant")
        .forEach(t => show(t.role, t.content, t.html));
    } else {
      show("error", body.error);
    }
  } catch (err) {
    pending.remove();
    show("error", String(err));
  } finally {
    input.disabled = false;
    input.focus();
  }
});

window.addEventListener("pagehide", endSession);
window.addEventListener("pageshow", (event) => {
  // A page restored from the back/forward cache lost its session on pagehide.
  if (event.persisted) transcript.replaceChildren();
  if (!sessionId) startSession();
});
</script>
</body>
</html>
"##;

/// Renders the chat page for the given chrome.
///
/// Chrome text is HTML-escaped and substituted in a single pass.
pub fn render_page(chrome: &PageChrome) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)?;
    env.get_template("page.html")?.render(context! {
        title => chrome.title,
        heading => chrome.heading(),
        caption => chrome.caption,
        placeholder => chrome.placeholder,
        examples => chrome.example_questions,
        about => chrome.about,
        powered_by => chrome.powered_by,
        pending => PENDING_MESSAGE,
    })
}
