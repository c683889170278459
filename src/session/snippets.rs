//! Built-in example snippets.

/// A named example that can be loaded into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet {
    pub name: &'static str,
    pub description: &'static str,
    pub code: &'static str,
}

/// Example loaded at startup.
pub const DEFAULT_EXAMPLE: &str = "home-page";

pub const EXAMPLES: &[Snippet] = &[
    Snippet {
        name: "home-page",
        description: "Minimal Next.js page component",
        code: r#"import React, { useState, useEffect } from 'react';
import { NextPage } from 'next';


const HomePage: NextPage = () => {
  return (
    <>
      <h1>Añade tu codigo a analizar</h1>
    </>
  );
};

export default HomePage;"#,
    },
    Snippet {
        name: "console-log",
        description: "Component with debug logging the optimizer can strip",
        code: r#"import { NextPage } from 'next';

const Counter: NextPage = () => {
  const count = 1;
  console.log("rendering counter", count);

  console.log("about to return");
  return <p>{count}</p>;
};

export default Counter;"#,
    },
    Snippet {
        name: "lexical-error",
        description: "Contains a character that is not valid in TSX source",
        code: r#"const price = 10 ¤ 2;
export default price;"#,
    },
    Snippet {
        name: "syntax-error",
        description: "Function body missing its closing brace",
        code: r#"function greet(name: string) {
  const message = "Hello " + name
  return message
"#,
    },
    Snippet {
        name: "semantic-error",
        description: "Type annotation that does not match the assigned value",
        code: r#"const total: number = "forty-two";
export default total;"#,
    },
];

/// Look up an example by name, ignoring ASCII case.
pub fn example(name: &str) -> Option<&'static Snippet> {
    EXAMPLES
        .iter()
        .find(|snippet| snippet.name.eq_ignore_ascii_case(name.trim()))
}
