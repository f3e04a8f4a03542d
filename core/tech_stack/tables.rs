// Static lookup tables for tech stack inference.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Files whose presence at the project root implies a technology.
/// Checked in this order, so earlier rows decide the output order.
pub const CONFIG_FILE_CHECKS: &[(&str, &str)] = &[
    // Type systems
    ("tsconfig.json", "TypeScript"),
    ("jsconfig.json", "JavaScript"),
    // Runtimes and package managers
    ("deno.json", "Deno"),
    ("deno.jsonc", "Deno"),
    ("bun.lockb", "Bun"),
    ("bun.lock", "Bun"),
    ("package-lock.json", "npm"),
    ("yarn.lock", "Yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("pnpm-workspace.yaml", "pnpm"),
    // Bundlers and build tools
    ("vite.config.ts", "Vite"),
    ("vite.config.js", "Vite"),
    ("vite.config.mjs", "Vite"),
    ("webpack.config.js", "Webpack"),
    ("webpack.config.ts", "Webpack"),
    ("rollup.config.js", "Rollup"),
    ("rollup.config.mjs", "Rollup"),
    ("esbuild.config.js", "esbuild"),
    ("babel.config.js", "Babel"),
    (".babelrc", "Babel"),
    ("turbo.json", "Turborepo"),
    ("nx.json", "Nx"),
    ("lerna.json", "Lerna"),
    // Frameworks
    ("next.config.js", "Next.js"),
    ("next.config.mjs", "Next.js"),
    ("next.config.ts", "Next.js"),
    ("nuxt.config.ts", "Nuxt"),
    ("nuxt.config.js", "Nuxt"),
    ("svelte.config.js", "Svelte"),
    ("astro.config.mjs", "Astro"),
    ("astro.config.ts", "Astro"),
    ("remix.config.js", "Remix"),
    ("angular.json", "Angular"),
    ("vue.config.js", "Vue"),
    ("gatsby-config.js", "Gatsby"),
    ("nest-cli.json", "NestJS"),
    // Styling
    ("tailwind.config.js", "Tailwind CSS"),
    ("tailwind.config.ts", "Tailwind CSS"),
    ("postcss.config.js", "PostCSS"),
    ("postcss.config.mjs", "PostCSS"),
    // Test frameworks
    ("jest.config.js", "Jest"),
    ("jest.config.ts", "Jest"),
    ("vitest.config.ts", "Vitest"),
    ("vitest.config.js", "Vitest"),
    ("playwright.config.ts", "Playwright"),
    ("playwright.config.js", "Playwright"),
    ("cypress.config.ts", "Cypress"),
    ("cypress.config.js", "Cypress"),
    ("karma.conf.js", "Karma"),
    // Linting and formatting
    (".eslintrc.json", "ESLint"),
    (".eslintrc.js", "ESLint"),
    ("eslint.config.js", "ESLint"),
    ("eslint.config.mjs", "ESLint"),
    (".prettierrc", "Prettier"),
    ("prettier.config.js", "Prettier"),
    ("biome.json", "Biome"),
    // Containers and platforms
    ("Dockerfile", "Docker"),
    ("docker-compose.yml", "Docker Compose"),
    ("docker-compose.yaml", "Docker Compose"),
    ("vercel.json", "Vercel"),
    ("netlify.toml", "Netlify"),
    ("wrangler.toml", "Cloudflare Workers"),
    ("prisma/schema.prisma", "Prisma"),
];

/// Exact dependency name to technology.
pub const DEP_TO_TECH: &[(&str, &str)] = &[
    // UI frameworks
    ("react", "React"),
    ("react-dom", "React"),
    ("react-native", "React Native"),
    ("next", "Next.js"),
    ("vue", "Vue"),
    ("nuxt", "Nuxt"),
    ("svelte", "Svelte"),
    ("@sveltejs/kit", "SvelteKit"),
    ("solid-js", "SolidJS"),
    ("preact", "Preact"),
    ("astro", "Astro"),
    ("gatsby", "Gatsby"),
    ("expo", "Expo"),
    ("electron", "Electron"),
    ("jquery", "jQuery"),
    // Servers
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("koa", "Koa"),
    ("hono", "Hono"),
    ("socket.io", "Socket.IO"),
    ("ws", "WebSocket"),
    // State and data
    ("redux", "Redux"),
    ("@reduxjs/toolkit", "Redux Toolkit"),
    ("mobx", "MobX"),
    ("zustand", "Zustand"),
    ("rxjs", "RxJS"),
    ("graphql", "GraphQL"),
    ("@apollo/client", "Apollo Client"),
    ("@apollo/server", "Apollo Server"),
    ("axios", "Axios"),
    ("zod", "Zod"),
    // Databases and ORMs
    ("prisma", "Prisma"),
    ("@prisma/client", "Prisma"),
    ("drizzle-orm", "Drizzle ORM"),
    ("typeorm", "TypeORM"),
    ("sequelize", "Sequelize"),
    ("mongoose", "MongoDB"),
    ("mongodb", "MongoDB"),
    ("pg", "PostgreSQL"),
    ("mysql2", "MySQL"),
    ("sqlite3", "SQLite"),
    ("better-sqlite3", "SQLite"),
    ("redis", "Redis"),
    ("ioredis", "Redis"),
    // Styling
    ("tailwindcss", "Tailwind CSS"),
    ("styled-components", "styled-components"),
    ("@emotion/react", "Emotion"),
    ("sass", "Sass"),
    ("bootstrap", "Bootstrap"),
    // Languages and tooling shipped as runtime deps
    ("typescript", "TypeScript"),
    ("three", "Three.js"),
    ("d3", "D3.js"),
    ("lodash", "Lodash"),
];

/// Scope (`@org/...`) to technology, consulted when the full name has no entry.
pub const ORG_TO_TECH: &[(&str, &str)] = &[
    ("angular", "Angular"),
    ("nestjs", "NestJS"),
    ("vue", "Vue"),
    ("sveltejs", "Svelte"),
    ("remix-run", "Remix"),
    ("mui", "Material UI"),
    ("chakra-ui", "Chakra UI"),
    ("radix-ui", "Radix UI"),
    ("headlessui", "Headless UI"),
    ("tanstack", "TanStack"),
    ("trpc", "tRPC"),
    ("supabase", "Supabase"),
    ("firebase", "Firebase"),
    ("aws-sdk", "AWS SDK"),
    ("google-cloud", "Google Cloud"),
    ("azure", "Azure"),
    ("vercel", "Vercel"),
    ("stripe", "Stripe"),
    ("sentry", "Sentry"),
    ("clerk", "Clerk"),
    ("tiptap", "Tiptap"),
    ("storybook", "Storybook"),
    ("testing-library", "Testing Library"),
    ("modelcontextprotocol", "Model Context Protocol"),
    ("anthropic-ai", "Anthropic SDK"),
    ("langchain", "LangChain"),
    ("types", "TypeScript"),
];

static DEP_TO_TECH_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DEP_TO_TECH.iter().copied().collect());

static ORG_TO_TECH_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| ORG_TO_TECH.iter().copied().collect());

pub fn tech_for_dependency(name: &str) -> Option<&'static str> {
    DEP_TO_TECH_MAP.get(name).copied()
}

pub fn tech_for_organization(org: &str) -> Option<&'static str> {
    ORG_TO_TECH_MAP.get(org).copied()
}
