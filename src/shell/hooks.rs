/// OSC 133 shell-integration hooks, one fragment per shell, eval'd from the
/// temp-directory rc file `pty::apply_shell_init` writes. Each hook reports
/// prompt start (A), command start (B), and command end with exit code (D).
pub fn shell_init_command(shell_name: &str) -> Option<String> {
    match shell_name {
        "zsh" => Some(ZSH_HOOK.to_string()),
        "bash" => Some(BASH_HOOK.to_string()),
        "fish" => Some(FISH_HOOK.to_string()),
        "pwsh" | "powershell" => Some(PWSH_HOOK.to_string()),
        _ => None,
    }
}

const ZSH_HOOK: &str = r#"
__ht_prompt_start() { printf '\033]133;A\007' }
__ht_cmd_start() { printf '\033]133;B\007' }
__ht_cmd_end() { printf '\033]133;D;%s\007' "$?" }
autoload -Uz add-zsh-hook
add-zsh-hook precmd __ht_cmd_end
add-zsh-hook precmd __ht_prompt_start
add-zsh-hook preexec __ht_cmd_start
"#;

const BASH_HOOK: &str = r#"
__ht_prompt_start() { printf '\033]133;A\007'; }
__ht_cmd_end() { printf '\033]133;D;%s\007' "$?"; }
PROMPT_COMMAND="__ht_cmd_end; __ht_prompt_start${PROMPT_COMMAND:+; $PROMPT_COMMAND}"
trap 'printf "\033]133;B\007"' DEBUG
"#;

const FISH_HOOK: &str = r#"
function __ht_prompt_start --on-event fish_prompt
    printf '\033]133;A\007'
end
function __ht_cmd_end --on-event fish_postexec
    printf '\033]133;D;%s\007' $status
end
"#;

const PWSH_HOOK: &str = r#"
function prompt {
    if ($null -ne $global:__ht_last_exit) {
        Write-Host -NoNewline "`e]133;D;$($global:__ht_last_exit)`a"
    }
    Write-Host -NoNewline "`e]133;A`a"
    "PS $($executionContext.SessionState.Path.CurrentLocation)$('>' * ($nestedPromptLevel + 1)) "
}
Set-PSReadLineKeyHandler -Key Enter -ScriptBlock {
    Write-Host -NoNewline "`e]133;B`a"
    [Microsoft.PowerShell.PSConsoleReadLine]::AcceptLine()
    $global:__ht_last_exit = $LASTEXITCODE
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_shell_has_no_hook() {
        assert_eq!(shell_init_command("tcsh"), None);
    }

    #[test]
    fn known_shells_each_have_a_hook() {
        for shell in ["zsh", "bash", "fish", "pwsh"] {
            assert!(shell_init_command(shell).is_some());
        }
    }
}
