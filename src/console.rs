//! Interactive console
//!
//! A line-oriented interpreter over an [`Inspector`]: selector searches with
//! `key=value` terms, result indexing, re-rooting, and the window-level
//! toggles. Evaluation is pure over (line, state) and returns the text to
//! print, so every command is unit testable; the REPL loop that feeds it
//! from stdin lives with the binary.

use std::fmt::Write as _;

use regex::Regex;

use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::geom::Rect;
use crate::inspect::Inspector;
use crate::registry::ClassRegistry;
use crate::selector::{ClassMatch, IdMatch, Selector, TextMatch, Traversal};
use crate::view::View;

const HELP: &str = "\
commands:
  roots                     list window roots
  activity                  show the resumed activity
  tree [depth]              print the hierarchy under the current scope
  find <terms>              best match for the terms (one result)
  all <terms>               every match in tree order
  use <n> | use -           re-root searches at result n / reset
  scope                     show the current search root
  mark <n>                  flash a highlight over result n
  enable <n> [on|off]       setEnabled on result n
  listeners <n>             listener slots installed on result n
  borders on|off            toggle layout-border drawing
  redraw                    invalidate every window
  webdebug                  enable WebView remote debugging
  clicks on|off             toggle click logging
  classes                   list registered classes
  quit                      leave the console
terms: text= desc= id= class= inside=l,t,r,b at=x,y mode=dfs|bfs
  values take \"quoted strings\", /regexes/ and @RegisteredClass";

/// One evaluated line: the text to print and whether the session ends.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn cont(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

fn ok(text: impl Into<String>) -> Result<Reply> {
    Ok(Reply::cont(text))
}

pub struct Console {
    inspector: Inspector,
    config: Config,
    scope: Option<View>,
    results: Vec<View>,
}

impl Console {
    pub fn new(inspector: Inspector, config: Config) -> Self {
        Self {
            inspector,
            config,
            scope: None,
            results: Vec::new(),
        }
    }

    pub fn prompt(&self) -> &'static str {
        "viewprobe> "
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    /// Evaluate one input line. Never fails; errors come back as `[!]` text.
    pub fn eval(&mut self, line: &str) -> Reply {
        match self.dispatch(line.trim()) {
            Ok(reply) => reply,
            Err(err) => Reply::cont(format!("[!] {}", err.user_message())),
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Reply> {
        if line.is_empty() {
            return ok("");
        }
        let tokens = tokenize(line)?;
        let (command, args) = tokens
            .split_first()
            .ok_or_else(|| ProbeError::Console("empty command".to_string()))?;
        match command.as_str() {
            "help" => ok(HELP),
            "quit" | "exit" => Ok(Reply {
                text: "[*] bye".to_string(),
                quit: true,
            }),
            "roots" => self.cmd_roots(),
            "activity" => self.cmd_activity(),
            "tree" => self.cmd_tree(args),
            "find" => self.cmd_find(args),
            "all" => self.cmd_all(args),
            "use" => self.cmd_use(args),
            "scope" => self.cmd_scope(),
            "mark" => self.cmd_mark(args),
            "enable" => self.cmd_enable(args),
            "listeners" => self.cmd_listeners(args),
            "borders" => {
                let state = parse_switch(args)?;
                self.inspector.show_layout_borders(state)?;
                ok(format!("[+] layout borders {}", switch_word(state)))
            }
            "redraw" => {
                self.inspector.invalidate_all()?;
                ok("[+] redraw scheduled for every window")
            }
            "webdebug" => {
                self.inspector.enable_web_debugging()?;
                ok("[+] WebView remote debugging enabled")
            }
            "clicks" => {
                let state = parse_switch(args)?;
                self.inspector.watch_clicks(state)?;
                ok(format!("[+] click logging {}", switch_word(state)))
            }
            "classes" => self.cmd_classes(),
            other => Err(ProbeError::Console(format!(
                "unknown command '{}' (try 'help')",
                other
            ))),
        }
    }

    fn search_root(&self) -> Result<View> {
        if let Some(scope) = &self.scope {
            return Ok(scope.clone());
        }
        self.inspector
            .current_root()?
            .ok_or_else(|| ProbeError::Console("no focused window (try 'roots')".to_string()))
    }

    fn build_selector(&self, root: View, terms: &[String]) -> Result<(Selector, Traversal)> {
        let mut selector = root.selector();
        let mut traversal = Traversal::default();
        for term in terms {
            let (key, value) = term.split_once('=').ok_or_else(|| {
                ProbeError::Console(format!("expected key=value, got '{}'", term))
            })?;
            match key {
                "text" => selector = selector.text(text_spec(value)?),
                "desc" => selector = selector.desc(text_spec(value)?),
                "id" => selector = selector.id(id_spec(value)?),
                "class" => {
                    selector = selector.class(class_spec(value, self.inspector.registry())?)
                }
                "inside" => selector = selector.bounds_inside(parse_rect(value)?),
                "at" => {
                    let (x, y) = parse_point(value)?;
                    selector = selector.bounds_contains(x, y);
                }
                "mode" => traversal = value.parse()?,
                other => {
                    return Err(ProbeError::Console(format!("unknown term '{}'", other)));
                }
            }
        }
        Ok((selector, traversal))
    }

    fn pick(&self, args: &[String]) -> Result<View> {
        let raw = args
            .first()
            .ok_or_else(|| ProbeError::Console("expected a result index".to_string()))?;
        let index: usize = raw
            .parse()
            .map_err(|_| ProbeError::Console(format!("'{}' is not an index", raw)))?;
        self.results.get(index).cloned().ok_or_else(|| {
            ProbeError::Console(format!("no result [{}] (run 'find' or 'all' first)", index))
        })
    }

    fn cmd_roots(&mut self) -> Result<Reply> {
        let roots = self.inspector.current_roots()?;
        let focused = self.inspector.current_root()?.map(|view| view.node());
        let mut text = String::new();
        for (index, root) in roots.iter().enumerate() {
            let marker = if Some(root.node()) == focused {
                " (focused)"
            } else {
                ""
            };
            let _ = writeln!(text, "[{}] {}{}", index, describe_or(root), marker);
        }
        let _ = write!(text, "[*] {} window(s)", roots.len());
        self.results = roots;
        ok(text)
    }

    fn cmd_activity(&mut self) -> Result<Reply> {
        match self.inspector.current_activity()? {
            Some(activity) => {
                let mut text = format!("[*] {}", activity.class_name());
                if let Some(intent) = activity.intent_uri() {
                    let _ = write!(text, "\n    intent: {}", intent);
                }
                if let Some(root) = activity.root()? {
                    let _ = write!(text, "\n    root: {}", describe_or(&root));
                }
                ok(text)
            }
            None => ok("[*] no resumed activity"),
        }
    }

    fn cmd_tree(&mut self, args: &[String]) -> Result<Reply> {
        let depth = match args.first() {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                ProbeError::Console(format!("'{}' is not a depth", raw))
            })?,
            None => self.config.tree_depth_limit,
        };
        let depth = Some(depth);
        let root = self.search_root()?;
        let dump = root.render_tree(depth);
        ok(dump.trim_end().to_string())
    }

    fn cmd_find(&mut self, terms: &[String]) -> Result<Reply> {
        let root = self.search_root()?;
        let (selector, traversal) = self.build_selector(root, terms)?;
        match selector.find_with(traversal) {
            Some(view) => {
                let text = format!("[+] [0] {}", describe_or(&view));
                self.results = vec![view];
                ok(text)
            }
            None => {
                self.results.clear();
                ok("[*] no match")
            }
        }
    }

    fn cmd_all(&mut self, terms: &[String]) -> Result<Reply> {
        let root = self.search_root()?;
        let (selector, _) = self.build_selector(root, terms)?;
        let views = selector.find_all();
        if views.is_empty() {
            self.results.clear();
            return ok("[*] no matches");
        }
        let mut text = String::new();
        for (index, view) in views.iter().enumerate() {
            let _ = writeln!(text, "[{}] {}", index, describe_or(view));
        }
        let _ = write!(text, "[*] {} match(es)", views.len());
        self.results = views;
        ok(text)
    }

    fn cmd_use(&mut self, args: &[String]) -> Result<Reply> {
        match args.first().map(String::as_str) {
            Some("-") => {
                self.scope = None;
                ok("[*] scope reset to the focused window")
            }
            Some(_) => {
                let view = self.pick(args)?;
                let text = format!("[+] scope = {}", describe_or(&view));
                self.scope = Some(view);
                ok(text)
            }
            None => Err(ProbeError::Console(
                "expected a result index or '-'".to_string(),
            )),
        }
    }

    fn cmd_scope(&self) -> Result<Reply> {
        match &self.scope {
            Some(scope) => ok(format!("[*] scope = {}", describe_or(scope))),
            None => ok("[*] scope = (focused window root)"),
        }
    }

    fn cmd_mark(&mut self, args: &[String]) -> Result<Reply> {
        let view = self.pick(args)?;
        view.mark_with(&self.config.mark);
        ok(format!("[+] marked {}", describe_or(&view)))
    }

    fn cmd_enable(&mut self, args: &[String]) -> Result<Reply> {
        let view = self.pick(args)?;
        let state = match args.get(1).map(String::as_str) {
            Some("off") => false,
            Some("on") | None => true,
            Some(other) => {
                return Err(ProbeError::Console(format!(
                    "expected on or off, got '{}'",
                    other
                )));
            }
        };
        view.enable(state)?;
        ok(format!("[+] setEnabled({}) on {}", state, describe_or(&view)))
    }

    fn cmd_listeners(&mut self, args: &[String]) -> Result<Reply> {
        let view = self.pick(args)?;
        let slots = view.listeners(&[])?;
        if slots.is_empty() {
            return ok("[*] no listener slots");
        }
        let mut text = String::new();
        for slot in &slots {
            let handler = slot.handler.as_deref().unwrap_or("(empty)");
            let _ = writeln!(text, "{} -> {}", slot.name, handler);
        }
        let _ = write!(text, "[*] {} slot(s)", slots.len());
        ok(text)
    }

    fn cmd_classes(&self) -> Result<Reply> {
        let names = self.inspector.registry().names();
        let mut text = String::new();
        for (name, fqcn) in &names {
            let _ = writeln!(text, "{} -> {}", name, fqcn);
        }
        let _ = write!(text, "[*] {} class(es)", names.len());
        ok(text)
    }
}

fn describe_or(view: &View) -> String {
    view.describe()
        .unwrap_or_else(|_| format!("<node {} unreadable>", view.node()))
}

fn switch_word(state: bool) -> &'static str {
    if state {
        "on"
    } else {
        "off"
    }
}

fn parse_switch(args: &[String]) -> Result<bool> {
    match args.first().map(String::as_str) {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(ProbeError::Console("expected on or off".to_string())),
    }
}

/// Split a line on whitespace, keeping double-quoted runs (quotes removed)
/// and `/.../` pattern runs (slashes kept) together.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut slashed = false;
    for ch in line.chars() {
        match ch {
            '"' if !slashed => quoted = !quoted,
            '/' if !quoted => {
                slashed = !slashed;
                current.push('/');
            }
            c if c.is_whitespace() && !quoted && !slashed => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err(ProbeError::Console("unterminated quote".to_string()));
    }
    if slashed {
        return Err(ProbeError::Console("unterminated pattern".to_string()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn pattern_of(value: &str) -> Result<Option<Regex>> {
    if value.len() >= 2 && value.starts_with('/') && value.ends_with('/') {
        let inner = &value[1..value.len() - 1];
        let re = Regex::new(inner)
            .map_err(|err| ProbeError::Console(format!("bad pattern '{}': {}", inner, err)))?;
        return Ok(Some(re));
    }
    Ok(None)
}

pub(crate) fn text_spec(value: &str) -> Result<TextMatch> {
    Ok(match pattern_of(value)? {
        Some(re) => TextMatch::from(re),
        None => TextMatch::from(value),
    })
}

pub(crate) fn id_spec(value: &str) -> Result<IdMatch> {
    if let Some(re) = pattern_of(value)? {
        return Ok(IdMatch::from(re));
    }
    if let Some(hex) = value.strip_prefix("0x") {
        if let Ok(raw) = i64::from_str_radix(hex, 16) {
            return Ok(IdMatch::Value(raw));
        }
    }
    if let Ok(raw) = value.parse::<i64>() {
        return Ok(IdMatch::Value(raw));
    }
    Ok(IdMatch::from(value))
}

pub(crate) fn class_spec(value: &str, registry: &ClassRegistry) -> Result<ClassMatch> {
    if let Some(re) = pattern_of(value)? {
        return Ok(ClassMatch::from(re));
    }
    if let Some(logical) = value.strip_prefix('@') {
        return Ok(ClassMatch::Instance(registry.get(logical)?));
    }
    Ok(ClassMatch::from(value))
}

fn parse_coords(value: &str, expected: usize) -> Result<Vec<i32>> {
    let parts: std::result::Result<Vec<i32>, _> =
        value.split(',').map(|part| part.trim().parse::<i32>()).collect();
    let parts = parts.map_err(|_| {
        ProbeError::Console(format!(
            "expected {} comma-separated integers, got '{}'",
            expected, value
        ))
    })?;
    if parts.len() != expected {
        return Err(ProbeError::Console(format!(
            "expected {} comma-separated integers, got '{}'",
            expected, value
        )));
    }
    Ok(parts)
}

pub(crate) fn parse_rect(value: &str) -> Result<Rect> {
    let parts = parse_coords(value, 4)?;
    Ok(Rect::new(parts[0], parts[1], parts[2], parts[3]))
}

pub(crate) fn parse_point(value: &str) -> Result<(i32, i32)> {
    let parts = parse_coords(value, 2)?;
    Ok((parts[0], parts[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::mem::MemHost;
    use std::sync::Arc;
    use std::time::Duration;

    fn console() -> (Arc<MemHost>, Console) {
        let mem = Arc::new(MemHost::demo());
        let inspector =
            Inspector::attach(mem.clone() as Arc<dyn crate::host::ViewHost>).unwrap();
        (mem, Console::new(inspector, Config::default()))
    }

    #[test]
    fn test_help_lists_commands() {
        let (_, mut console) = console();
        let reply = console.eval("help");
        assert!(reply.text.contains("find <terms>"));
        assert!(reply.text.contains("borders on|off"));
        assert!(!reply.quit);
    }

    #[test]
    fn test_quit() {
        let (_, mut first) = console();
        assert!(first.eval("quit").quit);
        let (_, mut second) = console();
        assert!(second.eval("exit").quit);
    }

    #[test]
    fn test_unknown_command() {
        let (_, mut console) = console();
        let reply = console.eval("frobnicate");
        assert!(reply.text.starts_with("[!]"));
        assert!(reply.text.contains("frobnicate"));
    }

    #[test]
    fn test_roots_marks_focused() {
        let (_, mut console) = console();
        let reply = console.eval("roots");
        assert!(reply.text.contains("[0]"));
        assert!(reply.text.contains("(focused)"));
        assert!(reply.text.contains("2 window(s)"));
    }

    #[test]
    fn test_activity_shows_resumed() {
        let (_, mut console) = console();
        let reply = console.eval("activity");
        assert!(reply.text.contains("LoginActivity"));
        assert!(reply.text.contains("intent:"));
    }

    #[test]
    fn test_find_quoted_text() {
        let (_, mut console) = console();
        let reply = console.eval("find text=\"Sign in\"");
        assert!(reply.text.contains("TextView"), "{}", reply.text);
        assert!(reply.text.contains("app:id/title"));
    }

    #[test]
    fn test_all_with_pattern() {
        let (_, mut console) = console();
        let reply = console.eval("all class=/.*EditText/");
        assert!(reply.text.contains("[0]"));
        assert!(reply.text.contains("[1]"));
        assert!(reply.text.contains("2 match(es)"));
    }

    #[test]
    fn test_find_at_point_picks_deepest() {
        let (_, mut console) = console();
        let reply = console.eval("find at=60,200");
        assert!(reply.text.contains("app:id/title"), "{}", reply.text);
    }

    #[test]
    fn test_registered_class_term() {
        let (_, mut console) = console();
        let reply = console.eval("all class=@TextView");
        // TextView, two EditTexts, the Button and the toast-free subtree total
        assert!(reply.text.contains("match(es)"), "{}", reply.text);
        assert!(reply.text.contains("app:id/title"));
        assert!(reply.text.contains("app:id/submit"));
    }

    #[test]
    fn test_use_and_scope() {
        let (_, mut console) = console();
        console.eval("all class=android.widget.FrameLayout");
        let reply = console.eval("use 0");
        assert!(reply.text.starts_with("[+] scope ="), "{}", reply.text);

        let reply = console.eval("find class=/.*Button/");
        assert!(reply.text.contains("app:id/submit"));

        let reply = console.eval("use -");
        assert!(reply.text.contains("reset"));
        let reply = console.eval("scope");
        assert!(reply.text.contains("(focused window root)"));
    }

    #[test]
    fn test_mark_then_revert_via_clock() {
        let (mem, mut console) = console();
        console.eval("find id=submit");
        let reply = console.eval("mark 0");
        assert!(reply.text.starts_with("[+] marked"));

        let node = console.results[0].node();
        mem.run_main_ready();
        assert!(mem.overlay(node).is_some());
        mem.advance_main(Duration::from_secs(3));
        assert!(mem.overlay(node).is_none());
    }

    #[test]
    fn test_enable_off() {
        let (mem, mut console) = console();
        console.eval("find id=submit");
        let node = console.results[0].node();
        let reply = console.eval("enable 0 off");
        assert!(reply.text.contains("setEnabled(false)"));
        assert!(!mem.enabled(node));
    }

    #[test]
    fn test_listeners_listing() {
        let (_, mut console) = console();
        console.eval("find id=submit");
        let reply = console.eval("listeners 0");
        assert!(reply.text.contains("Click ->"));
        assert!(reply.text.contains("Touch -> (empty)"));
    }

    #[test]
    fn test_toggles() {
        let (mem, mut console) = console();
        assert!(console.eval("borders on").text.starts_with("[+]"));
        assert!(mem.debug_draw());
        assert!(console.eval("borders off").text.starts_with("[+]"));
        assert!(!mem.debug_draw());

        assert!(console.eval("clicks on").text.starts_with("[+]"));
        assert!(mem.click_watching());

        assert!(console.eval("webdebug").text.starts_with("[+]"));
        assert!(mem.web_debugging());

        assert!(console.eval("borders sideways").text.starts_with("[!]"));
    }

    #[test]
    fn test_tree_with_depth_elides() {
        let (_, mut console) = console();
        let reply = console.eval("tree 1");
        assert!(reply.text.contains("children(s) ...]"));
    }

    #[test]
    fn test_classes_listing() {
        let (_, mut console) = console();
        let reply = console.eval("classes");
        assert!(reply.text.contains("WindowManagerGlobal -> android.view.WindowManagerGlobal"));
        assert!(reply.text.contains("18 class(es)"));
    }

    #[test]
    fn test_index_without_results() {
        let (_, mut console) = console();
        let reply = console.eval("mark 0");
        assert!(reply.text.starts_with("[!]"));
        assert!(reply.text.contains("find"));
    }

    #[test]
    fn test_tokenize_quotes() {
        let tokens = tokenize("find text=\"Sign in\" class=/a b/").unwrap();
        assert_eq!(tokens, ["find", "text=Sign in", "class=/a b/"]);
        assert!(tokenize("find text=\"open").is_err());
        assert!(tokenize("find class=/a b").is_err());
    }

    #[test]
    fn test_find_pattern_with_space() {
        let (_, mut console) = console();
        let reply = console.eval("find text=/Sign .*/");
        assert!(reply.text.contains("app:id/title"), "{}", reply.text);
    }

    #[test]
    fn test_spec_parsers() {
        assert!(matches!(text_spec("plain").unwrap(), TextMatch::Exact(_)));
        assert!(matches!(text_spec("/p.*n/").unwrap(), TextMatch::Pattern(_)));
        assert!(matches!(id_spec("-1").unwrap(), IdMatch::Value(-1)));
        assert!(matches!(
            id_spec("0x7f0800a1").unwrap(),
            IdMatch::Value(0x7f08_00a1)
        ));
        assert!(matches!(id_spec("title").unwrap(), IdMatch::Entry(_)));
        assert_eq!(parse_rect("0,0,10,20").unwrap(), Rect::new(0, 0, 10, 20));
        assert!(parse_rect("0,0,10").is_err());
        assert_eq!(parse_point(" 5, 6 ").unwrap(), (5, 6));
        assert!(parse_point("5").is_err());
    }
}
