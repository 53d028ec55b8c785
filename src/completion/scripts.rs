//! completion::scripts
//!
//! Shell integration scripts. The scripts know nothing about the command
//! tree; on every tab press they call back into the program with
//! `--completion-candidates <shell>:<param> -- <words...>`, where `<param>`
//! is the option being completed or `@` for a positional.

use super::CompletionShell;

const BASH: &str = r#"# bash completion for __PROG__
__FUNC__() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    local prev=""
    local param="@"
    if [[ ${COMP_CWORD} -gt 1 ]]; then
        prev="${COMP_WORDS[COMP_CWORD-1]}"
    fi
    if [[ "${prev}" == --* ]]; then
        param="${prev#--}"
    fi

    local IFS=$'\n'
    COMPREPLY=( $(compgen -W "$("__PROG__" --completion-candidates "bash:${param}" -- "${COMP_WORDS[@]:1:COMP_CWORD}" 2>/dev/null)" -- "${cur}") )
}

complete -o default -F __FUNC__ __PROG__
"#;

const ZSH: &str = r#"#compdef __PROG__

__FUNC__() {
    local prev="${words[CURRENT-1]}"
    local param="@"
    if [[ ${CURRENT} -gt 2 && "${prev}" == --* ]]; then
        param="${prev#--}"
    fi

    local -a candidates
    candidates=("${(@f)$("__PROG__" --completion-candidates "zsh:${param}" -- "${(@)words[2,CURRENT]}" 2>/dev/null)}")
    _describe 'values' candidates
}

compdef __FUNC__ __PROG__
"#;

fn function_name(program: &str) -> String {
    let sanitized: String = program
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("__{}_complete", sanitized)
}

/// Render the integration script for `shell`.
pub fn render(shell: CompletionShell, program: &str) -> String {
    let template = match shell {
        CompletionShell::Bash => BASH,
        CompletionShell::Zsh => ZSH,
    };
    template
        .replace("__FUNC__", &function_name(program))
        .replace("__PROG__", program)
}
